// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene traversal
//!
//! Depth-first descent over instances. Each level of the recursion returns the
//! child summaries and the faces found directly at that level; full entity
//! records and geometry records are collected on the side, in discovery order.
//!
//! ## Identifiers and deduplication
//!
//! An instance's `globalId` is derived from its definition's own identifier
//! (when it has one) and chained to the enclosing instance's id. Two
//! placements of one definition under the same parent therefore share an id:
//! the first one emits the full record, later ones are only referenced.
//!
//! ## Untyped groups
//!
//! A group whose definition has no schema type emits no record. Its typed
//! descendants are reported to the enclosing level instead, and the geometry
//! record of its direct faces is referenced by the next typed ancestor.
//!
//! ## Shared identifiers
//!
//! Repeat placements of one definition are not walked again. A different
//! definition that resolves to an id already listed is still walked; its
//! children and geometry are merged into the existing record.

use ifcjson_scene::{DefinitionKey, Entity, EntityKey, Face, Instance, Scene, Transformation, Triangulator};
use rustc_hash::FxHashMap;

use crate::attributes::{AttributeResolver, ResolvedAttributes};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::guid::{GlobalId, IdentifierService};
use crate::obj::ObjMesh;
use crate::records::{ChildSummary, EntityRecord, GeometryRecord, RepresentationRef};

/// Inherited state for one level of the recursion.
#[derive(Debug, Clone, Default)]
pub struct WalkContext {
    /// Accumulated transformation of all enclosing instances.
    pub transform: Transformation,
    /// Identifier of the enclosing instance, `None` at the model root.
    pub parent_id: Option<GlobalId>,
}

impl WalkContext {
    /// Context of the model root: identity transform, no parent.
    pub fn root() -> Self {
        Self::default()
    }
}

/// What one level of the recursion hands back to its caller.
#[derive(Debug, Default)]
pub struct Level<'s> {
    pub children: Vec<ChildSummary>,
    pub faces: Vec<&'s Face>,
    /// Geometry of untyped groups still waiting for a typed owner.
    pub representations: Vec<RepresentationRef>,
}

/// Records collected over a whole traversal.
#[derive(Debug, Default)]
pub struct WalkOutput {
    /// Full entity records, each `globalId` at most once, in pre-order.
    pub entities: Vec<EntityRecord>,
    /// Geometry records in creation order.
    pub geometry: Vec<GeometryRecord>,
}

/// Walks a scene, producing entity and geometry records.
pub struct SceneWalker<'a, I, T> {
    scene: &'a Scene,
    resolver: AttributeResolver<'a>,
    ids: I,
    triangulator: T,
    /// Listed ids, with the definition and record slot that produced them.
    seen: FxHashMap<String, (DefinitionKey, usize)>,
    /// Definitions currently being descended into.
    active: Vec<DefinitionKey>,
    output: WalkOutput,
}

impl<'a, I, T> SceneWalker<'a, I, T>
where
    I: IdentifierService,
    T: Triangulator,
{
    pub fn new(scene: &'a Scene, config: &'a ExportConfig, ids: I, triangulator: T) -> Self {
        Self {
            scene,
            resolver: AttributeResolver::new(config),
            ids,
            triangulator,
            seen: FxHashMap::default(),
            active: Vec::new(),
            output: WalkOutput::default(),
        }
    }

    /// Walks `keys` (one entity collection) under `ctx`.
    pub fn walk(&mut self, keys: &[EntityKey], ctx: &WalkContext) -> Result<Level<'a>> {
        let scene = self.scene;
        let mut level = Level::default();

        for &key in keys {
            let entity = scene
                .entity(key)
                .ok_or(ifcjson_scene::Error::EntityNotFound(key))?;

            match entity {
                Entity::Instance(instance) => self.visit_instance(instance, ctx, &mut level)?,
                Entity::Face(face) => level.faces.push(face),
                Entity::Other(kind) => tracing::trace!(kind = %kind, "Skipping unsupported entity"),
            }
        }

        Ok(level)
    }

    fn visit_instance(&mut self, instance: &Instance, ctx: &WalkContext, level: &mut Level<'a>) -> Result<()> {
        let scene = self.scene;
        let definition = scene
            .definition(instance.definition)
            .ok_or(ifcjson_scene::Error::DefinitionNotFound(instance.definition))?;

        if self.active.contains(&instance.definition) {
            return Err(Error::CyclicDefinition(definition.name.clone()));
        }

        let transform = ctx.transform.compose(&instance.transform);
        let ResolvedAttributes {
            entity_type,
            seed,
            fields,
        } = self.resolver.resolve(&definition.attributes);

        let mut id = self.ids.generate(seed.as_deref());
        if let Some(parent) = &ctx.parent_id {
            id.chain_to(parent);
        }
        let global_id = id.to_string();

        // Reserve the record's slot before descending so the list stays pre-order.
        let mut merging = false;
        let slot = match &entity_type {
            Some(entity_type) => match self.seen.get(&global_id) {
                Some(&(key, _)) if key == instance.definition => {
                    tracing::trace!(global_id = %global_id, "Repeated instance, referencing existing record");
                    level.children.push(ChildSummary::new(entity_type.clone(), global_id));
                    return Ok(());
                }
                Some(&(_, slot)) => {
                    tracing::debug!(
                        global_id = %global_id,
                        definition = %definition.name,
                        "Identifier shared with another definition, merging into existing record"
                    );
                    merging = true;
                    Some(slot)
                }
                None => {
                    let slot = self.output.entities.len();
                    self.seen.insert(global_id.clone(), (instance.definition, slot));
                    self.output.entities.push(EntityRecord {
                        attributes: fields,
                        volume: instance.volume.filter(|v| *v > 0.0),
                        ..EntityRecord::new(entity_type.clone(), global_id.clone())
                    });
                    Some(slot)
                }
            },
            None => None,
        };

        self.active.push(instance.definition);
        let inner = self.walk(
            &definition.entities,
            &WalkContext {
                transform,
                parent_id: Some(id),
            },
        );
        self.active.pop();
        let inner = inner?;

        // Direct faces are expressed in the enclosing frame, not this instance's.
        let representation = if inner.faces.is_empty() {
            None
        } else {
            let mesh = ObjMesh::encode(inner.faces.iter().copied(), &ctx.transform, &self.triangulator)?;
            let geometry_id = self.ids.generate(None).to_string();
            tracing::debug!(
                definition = %definition.name,
                faces = inner.faces.len(),
                vertices = mesh.vertex_count(),
                "Encoded geometry"
            );
            self.output
                .geometry
                .push(GeometryRecord::obj(geometry_id.clone(), mesh.to_string()));
            Some(RepresentationRef::shape(geometry_id))
        };

        match (slot, entity_type) {
            (Some(slot), Some(entity_type)) => {
                let record = &mut self.output.entities[slot];
                for child in inner.children {
                    if !merging || !record.is_decomposed_by.contains(&child) {
                        record.is_decomposed_by.push(child);
                    }
                }
                record.representations.extend(representation);
                record.representations.extend(inner.representations);
                level.children.push(ChildSummary::new(entity_type, global_id));
            }
            _ => {
                level.children.extend(inner.children);
                level.representations.extend(representation);
                level.representations.extend(inner.representations);
            }
        }

        Ok(())
    }

    /// Returns `true` if a full record with this id was already collected.
    pub fn contains(&self, global_id: &str) -> bool {
        self.seen.contains_key(global_id)
    }

    /// Consumes the walker, returning everything collected.
    pub fn finish(self) -> WalkOutput {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifcjson_scene::{
        AttributeDictionary, AttributeStorage, Definition, EarcutTriangulator, TriangulatedPolygon,
    };

    /// Hands out 1, 2, 3, ... ignoring seeds unless they parse as numbers.
    #[derive(Default)]
    struct CountingIds(u128);

    impl IdentifierService for CountingIds {
        fn generate(&mut self, seed: Option<&str>) -> GlobalId {
            if let Some(n) = seed.and_then(|s| s.parse().ok()) {
                return GlobalId::from_bits(n);
            }
            self.0 += 1;
            GlobalId::from_bits(self.0)
        }
    }

    /// One polygon per face, taken from the outer loop as-is.
    struct LoopTriangulator;

    impl Triangulator for LoopTriangulator {
        fn triangulate(&self, face: &Face) -> ifcjson_scene::Result<Vec<TriangulatedPolygon>> {
            Ok(vec![TriangulatedPolygon {
                points: face.outer.clone(),
                indices: (1..=face.outer.len() as i32).collect(),
            }])
        }
    }

    fn typed(scene: &mut Scene, name: &str, ifc_type: &str, seed: Option<&str>) -> DefinitionKey {
        let mut storage = AttributeStorage::new();
        storage.set_schema_type("IFC 2x3", ifc_type);
        let mut props = vec![AttributeDictionary::leaf("Name", name)];
        if let Some(seed) = seed {
            props.push(AttributeDictionary::leaf("GlobalId", seed));
        }
        storage.push_dictionary(AttributeDictionary::branch("IFC 2x3", props));
        scene.add_definition(Definition::with_attributes(name, storage))
    }

    fn triangle() -> Face {
        Face::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    fn place(scene: &mut Scene, parent: Option<DefinitionKey>, def: DefinitionKey) -> EntityKey {
        scene
            .add_instance(parent, Instance::new(def, Transformation::identity()))
            .unwrap()
    }

    fn run<'a>(scene: &'a Scene, config: &'a ExportConfig) -> (Level<'a>, WalkOutput) {
        let mut walker = SceneWalker::new(scene, config, CountingIds::default(), LoopTriangulator);
        let level = walker.walk(scene.root_entities(), &WalkContext::root()).unwrap();
        (level, walker.finish())
    }

    #[test]
    fn empty_level_returns_nothing() {
        let scene = Scene::new();
        let config = ExportConfig::default();
        let (level, output) = run(&scene, &config);
        assert!(level.children.is_empty());
        assert!(level.faces.is_empty());
        assert!(output.entities.is_empty());
        assert!(output.geometry.is_empty());
    }

    #[test]
    fn nested_typed_groups_are_summarized_and_listed_pre_order() {
        let mut scene = Scene::new();
        let building = typed(&mut scene, "Building", "IfcBuilding", None);
        let storey = typed(&mut scene, "Storey", "IfcBuildingStorey", None);
        let wall = typed(&mut scene, "Wall", "IfcWallStandardCase", None);
        place(&mut scene, None, building);
        place(&mut scene, Some(building), storey);
        place(&mut scene, Some(storey), wall);

        let config = ExportConfig::default();
        let (level, output) = run(&scene, &config);

        let types: Vec<_> = output.entities.iter().map(|e| e.entity_type.as_str()).collect();
        assert_eq!(types, ["Building", "BuildingStorey", "Wall"]);

        assert_eq!(level.children, vec![output.entities[0].summary()]);
        assert_eq!(output.entities[0].is_decomposed_by, vec![output.entities[1].summary()]);
        assert_eq!(output.entities[1].is_decomposed_by, vec![output.entities[2].summary()]);
        assert!(output.entities[2].is_decomposed_by.is_empty());
        assert_eq!(output.entities[2].attributes["name"], "Wall");
    }

    #[test]
    fn repeated_instances_emit_one_record() {
        let mut scene = Scene::new();
        let storey = typed(&mut scene, "Storey", "IfcBuildingStorey", None);
        let column = typed(&mut scene, "Column", "IfcColumn", Some("42"));
        scene.add_face(Some(column), triangle()).unwrap();
        place(&mut scene, None, storey);
        place(&mut scene, Some(storey), column);
        place(&mut scene, Some(storey), column);

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        assert_eq!(output.entities.len(), 2);
        let storey_record = &output.entities[0];
        assert_eq!(storey_record.is_decomposed_by.len(), 2);
        assert_eq!(storey_record.is_decomposed_by[0], storey_record.is_decomposed_by[1]);
        assert_eq!(storey_record.is_decomposed_by[0].global_id, output.entities[1].global_id);

        // The repeated placement is not walked again.
        assert_eq!(output.geometry.len(), 1);
    }

    #[test]
    fn same_definition_under_different_parents_gets_distinct_ids() {
        let mut scene = Scene::new();
        let a = typed(&mut scene, "A", "IfcBuildingStorey", None);
        let b = typed(&mut scene, "B", "IfcBuildingStorey", None);
        let door = typed(&mut scene, "Door", "IfcDoor", Some("7"));
        place(&mut scene, None, a);
        place(&mut scene, None, b);
        place(&mut scene, Some(a), door);
        place(&mut scene, Some(b), door);

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        let doors: Vec<_> = output
            .entities
            .iter()
            .filter(|e| e.entity_type == "Door")
            .map(|e| e.global_id.clone())
            .collect();
        assert_eq!(doors.len(), 2);
        assert_ne!(doors[0], doors[1]);
    }

    #[test]
    fn untyped_group_is_transparent() {
        let mut scene = Scene::new();
        let building = typed(&mut scene, "Building", "IfcBuilding", None);
        let group = scene.add_definition(Definition::new("Group#1"));
        let wall = typed(&mut scene, "Wall", "IfcWall", None);
        place(&mut scene, None, building);
        place(&mut scene, Some(building), group);
        place(&mut scene, Some(group), wall);

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        let types: Vec<_> = output.entities.iter().map(|e| e.entity_type.as_str()).collect();
        assert_eq!(types, ["Building", "Wall"]);
        // The wall surfaces at the next typed ancestor.
        assert_eq!(output.entities[0].is_decomposed_by, vec![output.entities[1].summary()]);
    }

    #[test]
    fn untyped_group_with_face_yields_geometry_only() {
        let mut scene = Scene::new();
        let group = scene.add_definition(Definition::new("Group#1"));
        scene.add_face(Some(group), triangle()).unwrap();
        place(&mut scene, None, group);

        let config = ExportConfig::default();
        let (level, output) = run(&scene, &config);

        assert!(level.children.is_empty());
        assert!(output.entities.is_empty());
        assert_eq!(output.geometry.len(), 1);
        // No typed owner anywhere above: the reference reaches the root unclaimed.
        assert_eq!(level.representations, vec![RepresentationRef::shape(output.geometry[0].global_id.clone())]);
        assert_eq!(output.geometry[0].items, vec!["v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n"]);
    }

    #[test]
    fn untyped_group_geometry_is_claimed_by_typed_ancestor() {
        let mut scene = Scene::new();
        let storey = typed(&mut scene, "Storey", "IfcBuildingStorey", None);
        let outer = scene.add_definition(Definition::new("Group#1"));
        let inner = scene.add_definition(Definition::new("Group#2"));
        scene.add_face(Some(outer), triangle()).unwrap();
        scene.add_face(Some(inner), triangle()).unwrap();
        place(&mut scene, None, storey);
        place(&mut scene, Some(storey), outer);
        place(&mut scene, Some(outer), inner);

        let config = ExportConfig::default();
        let (level, output) = run(&scene, &config);

        assert!(level.representations.is_empty());
        assert_eq!(output.geometry.len(), 2);
        let refs: Vec<_> = output.entities[0]
            .representations
            .iter()
            .map(|r| r.reference.as_str())
            .collect();
        for geometry in &output.geometry {
            assert!(refs.contains(&geometry.global_id.as_str()));
        }
    }

    #[test]
    fn definitions_sharing_a_seed_are_merged_not_dropped() {
        let mut scene = Scene::new();
        let storey = typed(&mut scene, "Storey", "IfcBuildingStorey", None);
        let a = typed(&mut scene, "Wall A", "IfcWall", Some("900"));
        let b = typed(&mut scene, "Wall B", "IfcWall", Some("900"));
        let door = typed(&mut scene, "Door", "IfcDoor", Some("901"));
        scene.add_face(Some(b), triangle()).unwrap();
        place(&mut scene, None, storey);
        place(&mut scene, Some(storey), a);
        place(&mut scene, Some(storey), b);
        place(&mut scene, Some(b), door);

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        let types: Vec<_> = output.entities.iter().map(|e| e.entity_type.as_str()).collect();
        assert_eq!(types, ["BuildingStorey", "Wall", "Door"]);

        // The first definition keeps the record; the second one's content is merged in.
        let wall = &output.entities[1];
        assert_eq!(wall.attributes["name"], "Wall A");
        assert_eq!(wall.is_decomposed_by, vec![output.entities[2].summary()]);
        assert_eq!(output.geometry.len(), 1);
        assert_eq!(
            wall.representations,
            vec![RepresentationRef::shape(output.geometry[0].global_id.clone())]
        );

        let storey_children = &output.entities[0].is_decomposed_by;
        assert_eq!(storey_children.len(), 2);
        assert_eq!(storey_children[0], storey_children[1]);
    }

    #[test]
    fn typed_group_references_its_geometry() {
        let mut scene = Scene::new();
        let slab = typed(&mut scene, "Slab", "IfcSlab", None);
        scene.add_face(Some(slab), triangle()).unwrap();
        scene.add_face(Some(slab), triangle()).unwrap();
        place(&mut scene, None, slab);

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        assert_eq!(output.geometry.len(), 1);
        assert_eq!(
            output.entities[0].representations,
            vec![RepresentationRef::shape(output.geometry[0].global_id.clone())]
        );
        assert!(output.geometry[0].items[0].ends_with("f 1 2 3\nf 4 5 6\n"));
        assert_ne!(output.geometry[0].global_id, output.entities[0].global_id);
    }

    #[test]
    fn faces_use_enclosing_frame() {
        let mut scene = Scene::new();
        let slab = typed(&mut scene, "Slab", "IfcSlab", None);
        scene.add_face(Some(slab), triangle()).unwrap();
        scene
            .add_instance(None, Instance::new(slab, Transformation::translation(5.0, 0.0, 0.0)))
            .unwrap();

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        // The slab's own translation is not applied to its direct faces.
        assert!(output.geometry[0].items[0].starts_with("v 0 0 0\n"));
    }

    #[test]
    fn volume_only_when_positive() {
        let mut scene = Scene::new();
        let solid = typed(&mut scene, "Solid", "IfcBuildingElementProxy", None);
        let open = typed(&mut scene, "Open", "IfcBuildingElementProxy", None);
        scene
            .add_instance(None, Instance::new(solid, Transformation::identity()).with_volume(2.0))
            .unwrap();
        scene
            .add_instance(None, Instance::new(open, Transformation::identity()).with_volume(0.0))
            .unwrap();

        let config = ExportConfig::default();
        let (_, output) = run(&scene, &config);

        assert_eq!(output.entities[0].volume, Some(2.0));
        assert_eq!(output.entities[1].volume, None);
    }

    #[test]
    fn root_faces_are_returned_not_encoded() {
        let mut scene = Scene::new();
        scene.add_face(None, triangle()).unwrap();
        scene.add_entity(None, Entity::Other("Text".into())).unwrap();

        let config = ExportConfig::default();
        let (level, output) = run(&scene, &config);

        assert_eq!(level.faces.len(), 1);
        assert!(output.geometry.is_empty());
    }

    #[test]
    fn cyclic_definition_is_an_error() {
        let mut scene = Scene::new();
        let a = typed(&mut scene, "Loop", "IfcSpace", None);
        place(&mut scene, Some(a), a);
        place(&mut scene, None, a);

        let config = ExportConfig::default();
        let mut walker = SceneWalker::new(&scene, &config, CountingIds::default(), EarcutTriangulator);
        let err = walker.walk(scene.root_entities(), &WalkContext::root()).unwrap_err();
        assert!(matches!(err, Error::CyclicDefinition(name) if name == "Loop"));
    }

    #[test]
    fn unknown_entity_is_an_error() {
        let scene = Scene::new();
        let config = ExportConfig::default();
        let mut walker = SceneWalker::new(&scene, &config, CountingIds::default(), EarcutTriangulator);
        let err = walker
            .walk(&[EntityKey::default()], &WalkContext::root())
            .unwrap_err();
        assert!(matches!(err, Error::Scene(ifcjson_scene::Error::EntityNotFound(_))));
    }
}
