//! Curriculum tree: levels, subbranches, units, subunits and outcomes

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tutorhub_http::{ApiClient, ApiRequest};

use crate::error::{CourseError, CourseResult};
use crate::rest::{fetch_first, fetch_items, segment};

/// Three-step scale used for subunit difficulty and weighting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subbranch {
    pub id: String,
    pub level_id: String,
    #[serde(default)]
    pub branch: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub id: String,
    pub subbranch_id: String,
    #[serde(default)]
    pub branch: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subunit {
    pub id: String,
    pub unit_id: String,
    #[serde(default)]
    pub branch: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub hardness: Option<Intensity>,
    #[serde(default)]
    pub priority: Option<Intensity>,
    #[serde(default)]
    pub background_level: Option<Intensity>,
    #[serde(default)]
    pub detail: Option<Intensity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub id: String,
    pub subunit_id: String,
    #[serde(default)]
    pub branch: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_active: bool,
}

/// A level with its subbranches, as returned by `full-tree`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullTreeLevel {
    #[serde(flatten)]
    pub level: Level,
    #[serde(default)]
    pub subbranches: Vec<Subbranch>,
}

/// Read-only curriculum endpoints
#[derive(Debug, Clone)]
pub struct CurriculumApi {
    client: ApiClient,
}

impl CurriculumApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn levels(&self) -> CourseResult<Vec<Level>> {
        fetch_items(&self.client, &ApiRequest::get("/api/curriculum/levels").auth()).await
    }

    pub async fn full_tree(&self) -> CourseResult<Vec<FullTreeLevel>> {
        fetch_items(&self.client, &ApiRequest::get("/api/curriculum/full-tree").auth()).await
    }

    pub async fn subbranches(&self, level_ids: &[String]) -> CourseResult<Vec<Subbranch>> {
        self.children("subbranches", level_ids).await
    }

    pub async fn units(&self, subbranch_ids: &[String]) -> CourseResult<Vec<Unit>> {
        self.children("units", subbranch_ids).await
    }

    pub async fn subunits(&self, unit_ids: &[String]) -> CourseResult<Vec<Subunit>> {
        self.children("subunits", unit_ids).await
    }

    pub async fn outcomes(&self, subunit_ids: &[String]) -> CourseResult<Vec<Outcome>> {
        self.children("outcomes", subunit_ids).await
    }

    pub async fn level_of_subbranch(&self, subbranch_id: &str) -> CourseResult<Option<Level>> {
        self.parent("level", subbranch_id).await
    }

    pub async fn subbranch_of_unit(&self, unit_id: &str) -> CourseResult<Option<Subbranch>> {
        self.parent("subbranch", unit_id).await
    }

    pub async fn unit_of_subunit(&self, subunit_id: &str) -> CourseResult<Option<Unit>> {
        self.parent("unit", subunit_id).await
    }

    pub async fn subunit_of_outcome(&self, outcome_id: &str) -> CourseResult<Option<Subunit>> {
        self.parent("subunit", outcome_id).await
    }

    /// Children of several parents at once; the body is a bare JSON array of ids
    async fn children<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        parent_ids: &[String],
    ) -> CourseResult<Vec<T>> {
        let req = ApiRequest::post(format!("/api/curriculum/children/{kind}"))
            .json(parent_ids)?
            .auth();
        fetch_items(&self.client, &req).await
    }

    async fn parent<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        child_id: &str,
    ) -> CourseResult<Option<T>> {
        let req =
            ApiRequest::get(format!("/api/curriculum/parents/{kind}/{}", segment(child_id))).auth();
        fetch_first(&self.client, &req).await
    }
}

/// A node that can be expanded in the browser
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurriculumNode {
    Level(String),
    Subbranch(String),
    Unit(String),
    Subunit(String),
}

/// Children loaded for one node
#[derive(Debug, Clone, PartialEq)]
pub enum CurriculumChildren {
    Subbranches(Vec<Subbranch>),
    Units(Vec<Unit>),
    Subunits(Vec<Subunit>),
    Outcomes(Vec<Outcome>),
}

impl CurriculumChildren {
    pub fn len(&self) -> usize {
        match self {
            CurriculumChildren::Subbranches(v) => v.len(),
            CurriculumChildren::Units(v) => v.len(),
            CurriculumChildren::Subunits(v) => v.len(),
            CurriculumChildren::Outcomes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazily loaded curriculum tree
///
/// Children are fetched the first time a node is expanded and served from
/// cache afterwards; collapsing keeps the cache.
#[derive(Debug)]
pub struct CurriculumBrowser {
    api: CurriculumApi,
    levels: Vec<Level>,
    children: HashMap<CurriculumNode, CurriculumChildren>,
    expanded: HashSet<CurriculumNode>,
}

impl CurriculumBrowser {
    pub fn new(api: CurriculumApi) -> Self {
        Self {
            api,
            levels: Vec::new(),
            children: HashMap::new(),
            expanded: HashSet::new(),
        }
    }

    /// Load the root levels
    pub async fn load(&mut self) -> CourseResult<&[Level]> {
        self.levels = self.api.levels().await?;
        Ok(&self.levels)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub async fn expand(&mut self, node: &CurriculumNode) -> CourseResult<&CurriculumChildren> {
        if !self.children.contains_key(node) {
            let loaded = self.fetch_children(node).await?;
            debug!(?node, count = loaded.len(), "Loaded curriculum children");
            self.children.insert(node.clone(), loaded);
        }
        self.expanded.insert(node.clone());
        self.children
            .get(node)
            .ok_or_else(|| CourseError::NotFound("curriculum node".into()))
    }

    pub fn collapse(&mut self, node: &CurriculumNode) {
        self.expanded.remove(node);
    }

    pub fn is_expanded(&self, node: &CurriculumNode) -> bool {
        self.expanded.contains(node)
    }

    /// Cached children, `None` if the node was never expanded
    pub fn children(&self, node: &CurriculumNode) -> Option<&CurriculumChildren> {
        self.children.get(node)
    }

    async fn fetch_children(&self, node: &CurriculumNode) -> CourseResult<CurriculumChildren> {
        Ok(match node {
            CurriculumNode::Level(id) => {
                CurriculumChildren::Subbranches(self.api.subbranches(&[id.clone()]).await?)
            }
            CurriculumNode::Subbranch(id) => {
                CurriculumChildren::Units(self.api.units(&[id.clone()]).await?)
            }
            CurriculumNode::Unit(id) => {
                CurriculumChildren::Subunits(self.api.subunits(&[id.clone()]).await?)
            }
            CurriculumNode::Subunit(id) => {
                CurriculumChildren::Outcomes(self.api.outcomes(&[id.clone()]).await?)
            }
        })
    }
}
