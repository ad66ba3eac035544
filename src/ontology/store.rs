//! In-memory ontology index.
//!
//! A pure index keyed by (scope, kind, local name); properties are keyed by
//! owner entity as well and shapes by the entity they apply to. The store
//! performs no validation beyond refusing artifacts from a foreign scope on
//! upsert. Absence on lookup is a normal outcome, reported as `None`.
//!
//! The store is not internally synchronized. Treat a loaded store as a
//! snapshot: build it, [`freeze`](OntologyStore::freeze) it and share the
//! `Arc` across readers.

use crate::domain::{
    AliasDef, Artifact, ArtifactKey, ArtifactKind, EntityDef, EnumDef, PropertyDef, RelationDef,
    ShapeDef, TenantScope,
};
use crate::error::OntologyError;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct ScopedIndex {
    entities: BTreeMap<String, EntityDef>,
    /// keyed by (owner entity, local name)
    properties: BTreeMap<(String, String), PropertyDef>,
    relations: BTreeMap<String, RelationDef>,
    enums: BTreeMap<String, EnumDef>,
    aliases: BTreeMap<String, AliasDef>,
    /// keyed by applies-to entity
    shapes: BTreeMap<String, ShapeDef>,
}

impl ScopedIndex {
    fn len(&self) -> usize {
        self.entities.len()
            + self.properties.len()
            + self.relations.len()
            + self.enums.len()
            + self.aliases.len()
            + self.shapes.len()
    }
}

/// Index of ontology artifacts for one or more scopes.
///
/// Enumeration order within a scope is sorted by key, so repeated runs over
/// unchanged content visit artifacts in the same order.
#[derive(Debug, Clone, Default)]
pub struct OntologyStore {
    scopes: BTreeMap<TenantScope, ScopedIndex>,
}

/// Collects `items`, failing before anything is written if one of them
/// belongs to a different scope.
fn checked<T>(
    scope: &TenantScope,
    items: impl IntoIterator<Item = T>,
    scope_of: impl Fn(&T) -> &TenantScope,
) -> Result<Vec<T>, OntologyError> {
    let items: Vec<T> = items.into_iter().collect();
    for item in &items {
        scope.ensure_same(scope_of(item))?;
    }
    Ok(items)
}

impl OntologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the store for sharing as an immutable snapshot.
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn index(&self, scope: &TenantScope) -> Option<&ScopedIndex> {
        self.scopes.get(scope)
    }

    fn index_mut(&mut self, scope: &TenantScope) -> &mut ScopedIndex {
        self.scopes.entry(scope.clone()).or_default()
    }

    /// Scopes that currently hold at least one artifact.
    pub fn scopes(&self) -> impl Iterator<Item = &TenantScope> + '_ {
        self.scopes
            .iter()
            .filter(|(_, index)| index.len() > 0)
            .map(|(scope, _)| scope)
    }

    pub fn artifact_count(&self, scope: &TenantScope) -> usize {
        self.index(scope).map_or(0, ScopedIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(|index| index.len() == 0)
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    pub fn upsert_entities(
        &mut self,
        scope: &TenantScope,
        entities: impl IntoIterator<Item = EntityDef>,
    ) -> Result<usize, OntologyError> {
        let entities = checked(scope, entities, |e| &e.scope)?;
        let count = entities.len();
        let index = self.index_mut(scope);
        for entity in entities {
            index.entities.insert(entity.local_name.clone(), entity);
        }
        tracing::debug!(scope = %scope, count, "upserted entities");
        Ok(count)
    }

    pub fn get_entity(&self, scope: &TenantScope, local_name: &str) -> Option<&EntityDef> {
        self.index(scope)?.entities.get(local_name)
    }

    pub fn list_entities<'a>(
        &'a self,
        scope: &TenantScope,
    ) -> impl Iterator<Item = &'a EntityDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.entities.values())
    }

    pub fn delete_entity(&mut self, scope: &TenantScope, local_name: &str) -> Option<EntityDef> {
        self.scopes.get_mut(scope)?.entities.remove(local_name)
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    pub fn upsert_properties(
        &mut self,
        scope: &TenantScope,
        properties: impl IntoIterator<Item = PropertyDef>,
    ) -> Result<usize, OntologyError> {
        let properties = checked(scope, properties, |p| &p.scope)?;
        let count = properties.len();
        let index = self.index_mut(scope);
        for property in properties {
            let key = (property.owner_entity.clone(), property.local_name.clone());
            index.properties.insert(key, property);
        }
        tracing::debug!(scope = %scope, count, "upserted properties");
        Ok(count)
    }

    pub fn get_property(
        &self,
        scope: &TenantScope,
        owner_entity: &str,
        local_name: &str,
    ) -> Option<&PropertyDef> {
        self.index(scope)?
            .properties
            .get(&(owner_entity.to_string(), local_name.to_string()))
    }

    pub fn list_properties<'a>(
        &'a self,
        scope: &TenantScope,
    ) -> impl Iterator<Item = &'a PropertyDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.properties.values())
    }

    /// Properties owned by one entity.
    pub fn properties_of<'a>(
        &'a self,
        scope: &TenantScope,
        owner_entity: &'a str,
    ) -> impl Iterator<Item = &'a PropertyDef> + 'a {
        self.list_properties(scope)
            .filter(move |p| p.owner_entity == owner_entity)
    }

    pub fn delete_property(
        &mut self,
        scope: &TenantScope,
        owner_entity: &str,
        local_name: &str,
    ) -> Option<PropertyDef> {
        self.scopes
            .get_mut(scope)?
            .properties
            .remove(&(owner_entity.to_string(), local_name.to_string()))
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    pub fn upsert_relations(
        &mut self,
        scope: &TenantScope,
        relations: impl IntoIterator<Item = RelationDef>,
    ) -> Result<usize, OntologyError> {
        let relations = checked(scope, relations, |r| &r.scope)?;
        let count = relations.len();
        let index = self.index_mut(scope);
        for relation in relations {
            index.relations.insert(relation.local_name.clone(), relation);
        }
        tracing::debug!(scope = %scope, count, "upserted relations");
        Ok(count)
    }

    pub fn get_relation(&self, scope: &TenantScope, local_name: &str) -> Option<&RelationDef> {
        self.index(scope)?.relations.get(local_name)
    }

    pub fn list_relations<'a>(
        &'a self,
        scope: &TenantScope,
    ) -> impl Iterator<Item = &'a RelationDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.relations.values())
    }

    pub fn delete_relation(
        &mut self,
        scope: &TenantScope,
        local_name: &str,
    ) -> Option<RelationDef> {
        self.scopes.get_mut(scope)?.relations.remove(local_name)
    }

    // ------------------------------------------------------------------
    // Enums
    // ------------------------------------------------------------------

    pub fn upsert_enums(
        &mut self,
        scope: &TenantScope,
        enums: impl IntoIterator<Item = EnumDef>,
    ) -> Result<usize, OntologyError> {
        let enums = checked(scope, enums, |e| &e.scope)?;
        let count = enums.len();
        let index = self.index_mut(scope);
        for def in enums {
            index.enums.insert(def.local_name.clone(), def);
        }
        tracing::debug!(scope = %scope, count, "upserted enums");
        Ok(count)
    }

    pub fn get_enum(&self, scope: &TenantScope, local_name: &str) -> Option<&EnumDef> {
        self.index(scope)?.enums.get(local_name)
    }

    pub fn list_enums<'a>(&'a self, scope: &TenantScope) -> impl Iterator<Item = &'a EnumDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.enums.values())
    }

    pub fn delete_enum(&mut self, scope: &TenantScope, local_name: &str) -> Option<EnumDef> {
        self.scopes.get_mut(scope)?.enums.remove(local_name)
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    pub fn upsert_aliases(
        &mut self,
        scope: &TenantScope,
        aliases: impl IntoIterator<Item = AliasDef>,
    ) -> Result<usize, OntologyError> {
        let aliases = checked(scope, aliases, |a| &a.scope)?;
        let count = aliases.len();
        let index = self.index_mut(scope);
        for alias in aliases {
            index.aliases.insert(alias.local_name.clone(), alias);
        }
        tracing::debug!(scope = %scope, count, "upserted aliases");
        Ok(count)
    }

    pub fn get_alias(&self, scope: &TenantScope, local_name: &str) -> Option<&AliasDef> {
        self.index(scope)?.aliases.get(local_name)
    }

    pub fn list_aliases<'a>(
        &'a self,
        scope: &TenantScope,
    ) -> impl Iterator<Item = &'a AliasDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.aliases.values())
    }

    pub fn delete_alias(&mut self, scope: &TenantScope, local_name: &str) -> Option<AliasDef> {
        self.scopes.get_mut(scope)?.aliases.remove(local_name)
    }

    /// Canonical name for an alternate spelling.
    ///
    /// An alias qualified with `locale` wins over a locale-neutral one.
    /// Alternate names compare case-insensitively, locales likewise.
    pub fn resolve_alias(
        &self,
        scope: &TenantScope,
        alternate: &str,
        locale: Option<&str>,
    ) -> Option<&str> {
        let mut neutral = None;
        for alias in self.list_aliases(scope) {
            if !alias.alternate.eq_ignore_ascii_case(alternate) {
                continue;
            }
            match (alias.locale.as_deref(), locale) {
                (Some(have), Some(want)) if have.eq_ignore_ascii_case(want) => {
                    return Some(&alias.canonical);
                }
                (None, _) if neutral.is_none() => neutral = Some(alias.canonical.as_str()),
                _ => {}
            }
        }
        neutral
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    pub fn upsert_shapes(
        &mut self,
        scope: &TenantScope,
        shapes: impl IntoIterator<Item = ShapeDef>,
    ) -> Result<usize, OntologyError> {
        let shapes = checked(scope, shapes, |s| &s.scope)?;
        let count = shapes.len();
        let index = self.index_mut(scope);
        for shape in shapes {
            index.shapes.insert(shape.applies_to_entity.clone(), shape);
        }
        tracing::debug!(scope = %scope, count, "upserted shapes");
        Ok(count)
    }

    pub fn get_shape(&self, scope: &TenantScope, applies_to_entity: &str) -> Option<&ShapeDef> {
        self.index(scope)?.shapes.get(applies_to_entity)
    }

    pub fn list_shapes<'a>(
        &'a self,
        scope: &TenantScope,
    ) -> impl Iterator<Item = &'a ShapeDef> + 'a {
        self.index(scope)
            .into_iter()
            .flat_map(|index| index.shapes.values())
    }

    pub fn delete_shape(
        &mut self,
        scope: &TenantScope,
        applies_to_entity: &str,
    ) -> Option<ShapeDef> {
        self.scopes.get_mut(scope)?.shapes.remove(applies_to_entity)
    }

    // ------------------------------------------------------------------
    // Kind-erased access (persistence boundary)
    // ------------------------------------------------------------------

    /// Upserts a mixed batch. Every artifact is scope-checked before any is
    /// written.
    pub fn upsert(
        &mut self,
        scope: &TenantScope,
        artifacts: impl IntoIterator<Item = Artifact>,
    ) -> Result<usize, OntologyError> {
        let artifacts = checked(scope, artifacts, Artifact::scope)?;
        let count = artifacts.len();
        for artifact in artifacts {
            match artifact {
                Artifact::Entity(a) => self.upsert_entities(scope, [a])?,
                Artifact::Property(a) => self.upsert_properties(scope, [a])?,
                Artifact::Relation(a) => self.upsert_relations(scope, [a])?,
                Artifact::Enum(a) => self.upsert_enums(scope, [a])?,
                Artifact::Alias(a) => self.upsert_aliases(scope, [a])?,
                Artifact::Shape(a) => self.upsert_shapes(scope, [a])?,
            };
        }
        Ok(count)
    }

    pub fn get(&self, scope: &TenantScope, key: &ArtifactKey) -> Option<Artifact> {
        match key {
            ArtifactKey::Entity { name } => self.get_entity(scope, name).cloned().map(Artifact::Entity),
            ArtifactKey::Property { owner, name } => self
                .get_property(scope, owner, name)
                .cloned()
                .map(Artifact::Property),
            ArtifactKey::Relation { name } => {
                self.get_relation(scope, name).cloned().map(Artifact::Relation)
            }
            ArtifactKey::Enum { name } => self.get_enum(scope, name).cloned().map(Artifact::Enum),
            ArtifactKey::Alias { name } => self.get_alias(scope, name).cloned().map(Artifact::Alias),
            ArtifactKey::Shape { applies_to } => {
                self.get_shape(scope, applies_to).cloned().map(Artifact::Shape)
            }
        }
    }

    pub fn list(&self, scope: &TenantScope, kind: ArtifactKind) -> Vec<Artifact> {
        match kind {
            ArtifactKind::Entity => self.list_entities(scope).cloned().map(Artifact::Entity).collect(),
            ArtifactKind::Property => self
                .list_properties(scope)
                .cloned()
                .map(Artifact::Property)
                .collect(),
            ArtifactKind::Relation => self
                .list_relations(scope)
                .cloned()
                .map(Artifact::Relation)
                .collect(),
            ArtifactKind::Enum => self.list_enums(scope).cloned().map(Artifact::Enum).collect(),
            ArtifactKind::Alias => self.list_aliases(scope).cloned().map(Artifact::Alias).collect(),
            ArtifactKind::Shape => self.list_shapes(scope).cloned().map(Artifact::Shape).collect(),
        }
    }

    /// Removes one artifact; returns whether anything was removed.
    pub fn delete(&mut self, scope: &TenantScope, key: &ArtifactKey) -> bool {
        match key {
            ArtifactKey::Entity { name } => self.delete_entity(scope, name).is_some(),
            ArtifactKey::Property { owner, name } => {
                self.delete_property(scope, owner, name).is_some()
            }
            ArtifactKey::Relation { name } => self.delete_relation(scope, name).is_some(),
            ArtifactKey::Enum { name } => self.delete_enum(scope, name).is_some(),
            ArtifactKey::Alias { name } => self.delete_alias(scope, name).is_some(),
            ArtifactKey::Shape { applies_to } => self.delete_shape(scope, applies_to).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scope_a() -> TenantScope {
        TenantScope::parse("acme", "core", "stable").unwrap()
    }

    fn scope_b() -> TenantScope {
        TenantScope::parse("globex", "core", "stable").unwrap()
    }

    #[test]
    fn test_upsert_replaces_instead_of_duplicating() {
        let mut store = OntologyStore::new();
        let scope = scope_a();
        store
            .upsert_entities(&scope, [EntityDef::new(scope.clone(), "Order")])
            .unwrap();
        store
            .upsert_entities(
                &scope,
                [EntityDef::new(scope.clone(), "Order").with_parent("Document")],
            )
            .unwrap();

        assert_eq!(store.list_entities(&scope).count(), 1);
        assert_eq!(
            store.get_entity(&scope, "Order").unwrap().parents,
            vec!["Document".to_string()]
        );
    }

    #[test]
    fn test_upsert_rejects_foreign_scope_without_partial_writes() {
        let mut store = OntologyStore::new();
        let result = store.upsert_entities(
            &scope_a(),
            [
                EntityDef::new(scope_a(), "Order"),
                EntityDef::new(scope_b(), "Invoice"),
            ],
        );
        assert_matches!(result, Err(OntologyError::ScopeMismatch { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_lookups_never_cross_scopes() {
        let mut store = OntologyStore::new();
        store
            .upsert_entities(&scope_b(), [EntityDef::new(scope_b(), "Widget")])
            .unwrap();
        assert!(store.get_entity(&scope_a(), "Widget").is_none());
        assert!(store.get_entity(&scope_b(), "Widget").is_some());
    }

    #[test]
    fn test_properties_are_keyed_by_owner() {
        let mut store = OntologyStore::new();
        let scope = scope_a();
        store
            .upsert_properties(
                &scope,
                [
                    PropertyDef::new(scope.clone(), "Order", "status"),
                    PropertyDef::new(scope.clone(), "Invoice", "status"),
                ],
            )
            .unwrap();

        assert_eq!(store.list_properties(&scope).count(), 2);
        assert!(store.get_property(&scope, "Order", "status").is_some());
        assert!(store.get_property(&scope, "Customer", "status").is_none());
        assert_eq!(store.properties_of(&scope, "Invoice").count(), 1);
    }

    #[test]
    fn test_delete_by_key_removes_only_that_artifact() {
        let mut store = OntologyStore::new();
        let scope = scope_a();
        store
            .upsert(
                &scope,
                [
                    Artifact::Entity(EntityDef::new(scope.clone(), "Order")),
                    Artifact::Shape(ShapeDef::new(scope.clone(), "OrderShape", "Order")),
                ],
            )
            .unwrap();

        assert!(store.delete(
            &scope,
            &ArtifactKey::Shape {
                applies_to: "Order".into()
            }
        ));
        assert!(!store.delete(
            &scope,
            &ArtifactKey::Shape {
                applies_to: "Order".into()
            }
        ));
        assert_eq!(store.artifact_count(&scope), 1);
    }

    #[test]
    fn test_resolve_alias_prefers_locale_match() {
        let mut store = OntologyStore::new();
        let scope = scope_a();
        store
            .upsert_aliases(
                &scope,
                [
                    AliasDef::new(scope.clone(), "colour", "Color", "colour"),
                    AliasDef::new(scope.clone(), "colour-gb", "ColourGb", "colour").with_locale("en-GB"),
                ],
            )
            .unwrap();

        assert_eq!(store.resolve_alias(&scope, "Colour", Some("en-gb")), Some("ColourGb"));
        assert_eq!(store.resolve_alias(&scope, "colour", Some("fr")), Some("Color"));
        assert_eq!(store.resolve_alias(&scope, "colour", None), Some("Color"));
        assert_eq!(store.resolve_alias(&scope, "hue", None), None);
    }
}
