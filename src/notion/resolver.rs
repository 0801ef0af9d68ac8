//! Recursive relation resolution.
//!
//! Builds the full page tree for one root page: every `relation` property
//! is replaced by the resolved pages it references, depth-first, with
//! sibling targets fetched concurrently. A per-call visited set guarantees
//! termination on cyclic graphs: a page seen again on the same resolution
//! resolves to an empty-properties stub instead of recursing.

use super::{NotionApi, NotionError};
use crate::domain::{PageNode, PropertyValue, ResolvedProperty};
use futures::future::{self, BoxFuture};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PageResolver {
    api: Arc<dyn NotionApi>,
}

impl PageResolver {
    pub fn new(api: Arc<dyn NotionApi>) -> Self {
        Self { api }
    }

    /// Resolve `id` and all transitively related pages into one tree.
    /// The visited set lives only for the duration of this call.
    pub async fn resolve(&self, id: &str) -> Result<PageNode, NotionError> {
        let visited = Arc::new(Mutex::new(HashSet::new()));
        visited
            .lock()
            .expect("lock poisoned")
            .insert(id.to_string());
        self.resolve_node(id.to_string(), visited).await
    }

    fn resolve_node(
        &self,
        id: String,
        visited: Arc<Mutex<HashSet<String>>>,
    ) -> BoxFuture<'_, Result<PageNode, NotionError>> {
        Box::pin(async move {
            debug!("Resolving page {}", id);
            let raw = self.api.fetch_page(&id).await?;

            let mut properties = BTreeMap::new();
            for (name, value) in raw.properties {
                match value {
                    PropertyValue::Relation(targets) => {
                        let resolved = self.resolve_targets(targets, &visited).await?;
                        properties.insert(name, ResolvedProperty::Relations(resolved));
                    }
                    other => {
                        properties.insert(name, ResolvedProperty::Value(other));
                    }
                }
            }

            Ok(PageNode { id, properties })
        })
    }

    /// Fan out over the targets of one relation property, preserving the
    /// original order. Each id is marked visited before its fetch starts
    /// so mutual and self relations terminate.
    async fn resolve_targets(
        &self,
        targets: Vec<String>,
        visited: &Arc<Mutex<HashSet<String>>>,
    ) -> Result<Vec<PageNode>, NotionError> {
        let fetches: Vec<_> = targets
            .into_iter()
            .map(|target| {
                let first_visit = visited
                    .lock()
                    .expect("lock poisoned")
                    .insert(target.clone());
                let visited = visited.clone();
                async move {
                    if first_visit {
                        self.resolve_node(target, visited).await
                    } else {
                        Ok(PageNode::stub(target))
                    }
                }
            })
            .collect();

        future::try_join_all(fetches).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::MockNotion;
    use serde_json::json;

    fn page(id: &str, relations: &[(&str, &[&str])]) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            "Name".to_string(),
            json!({"type": "title", "title": [{"plain_text": id}]}),
        );
        for (name, targets) in relations {
            let refs: Vec<_> = targets.iter().map(|t| json!({"id": t})).collect();
            properties.insert(
                name.to_string(),
                json!({"type": "relation", "relation": refs}),
            );
        }
        json!({"id": id, "properties": properties})
    }

    fn related_ids(node: &PageNode, property: &str) -> Vec<String> {
        match node.properties.get(property) {
            Some(ResolvedProperty::Relations(nodes)) => {
                nodes.iter().map(|n| n.id.clone()).collect()
            }
            other => panic!("Expected resolved relations, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolves_nested_relations() {
        let api = Arc::new(
            MockNotion::new()
                .with_page(page("root", &[("Client", &["c1"])]))
                .with_page(page("c1", &[("Company", &["co1"])]))
                .with_page(page("co1", &[])),
        );
        let resolver = PageResolver::new(api);

        let tree = resolver.resolve("root").await.unwrap();
        assert_eq!(related_ids(&tree, "Client"), vec!["c1"]);

        let ResolvedProperty::Relations(clients) = &tree.properties["Client"] else {
            unreachable!()
        };
        assert_eq!(related_ids(&clients[0], "Company"), vec!["co1"]);
    }

    #[tokio::test]
    async fn test_cycle_resolves_to_stub() {
        let api = Arc::new(
            MockNotion::new()
                .with_page(page("a", &[("Next", &["b"])]))
                .with_page(page("b", &[("Next", &["a"])])),
        );
        let resolver = PageResolver::new(api.clone());

        let tree = resolver.resolve("a").await.unwrap();
        let ResolvedProperty::Relations(next) = &tree.properties["Next"] else {
            unreachable!()
        };
        let ResolvedProperty::Relations(back) = &next[0].properties["Next"] else {
            unreachable!()
        };

        // The second occurrence of "a" is a stub, not a re-fetch.
        assert_eq!(back[0], PageNode::stub("a".to_string()));
        assert_eq!(api.fetched_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_self_relation_terminates() {
        let api = Arc::new(MockNotion::new().with_page(page("a", &[("Self", &["a"])])));
        let resolver = PageResolver::new(api.clone());

        let tree = resolver.resolve("a").await.unwrap();
        let ResolvedProperty::Relations(selves) = &tree.properties["Self"] else {
            unreachable!()
        };
        assert!(selves[0].properties.is_empty());
        assert_eq!(api.fetched_ids().len(), 1);
    }

    #[tokio::test]
    async fn test_sibling_order_preserved() {
        let api = Arc::new(
            MockNotion::new()
                .with_page(page("root", &[("Items", &["i3", "i1", "i2"])]))
                .with_page(page("i1", &[]))
                .with_page(page("i2", &[]))
                .with_page(page("i3", &[])),
        );
        let resolver = PageResolver::new(api);

        let tree = resolver.resolve("root").await.unwrap();
        assert_eq!(related_ids(&tree, "Items"), vec!["i3", "i1", "i2"]);
    }

    #[tokio::test]
    async fn test_missing_root_propagates_not_found() {
        let resolver = PageResolver::new(Arc::new(MockNotion::new()));
        let err = resolver.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, NotionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_shared_target_fetched_once() {
        // Two relation properties referencing the same page: the second
        // reference resolves to a stub within the same call.
        let api = Arc::new(
            MockNotion::new()
                .with_page(page("root", &[("A", &["shared"]), ("B", &["shared"])]))
                .with_page(page("shared", &[])),
        );
        let resolver = PageResolver::new(api.clone());

        resolver.resolve("root").await.unwrap();
        let fetched = api.fetched_ids();
        assert_eq!(
            fetched.iter().filter(|id| id.as_str() == "shared").count(),
            1
        );
    }
}
