//! The category tree
//!
//! A [`Category`] exclusively owns its questions and sub-categories, so a node has at
//! most one parent and the tree cannot contain cycles. Children record their parent
//! as a [`CategoryId`] which only the mutation methods here set or clear.

use super::question::{Question, QuestionType};
use crate::error::ModelError;
use crate::files::FileRef;
use crate::text::ftext::FText;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CATEGORY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(u64);

impl CategoryId {
    pub fn next() -> Self {
        CategoryId(NEXT_CATEGORY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::next()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CategoryData")]
pub struct Category {
    #[serde(skip)]
    id: CategoryId,
    name: String,
    pub info: FText,
    pub metadata: BTreeMap<String, String>,
    questions: Vec<Question>,
    subcats: Vec<Category>,
    #[serde(skip)]
    parent: Option<CategoryId>,
}

/// Serialized shape of a category; loading relinks parents.
#[derive(Deserialize)]
struct CategoryData {
    name: String,
    #[serde(default)]
    info: FText,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default)]
    subcats: Vec<Category>,
}

impl From<CategoryData> for Category {
    fn from(data: CategoryData) -> Self {
        let mut category = Category::new(data.name);
        category.info = data.info;
        category.metadata = data.metadata;
        for question in data.questions {
            if let Err(question) = category.add_question(question) {
                let _ = category.add_question(question.duplicate());
            }
        }
        for mut subcat in data.subcats {
            if category.subcat(&subcat.name).is_some() {
                let renamed = unique_name(&category, &subcat.name);
                tracing::warn!(
                    error = %ModelError::DuplicateName(subcat.name.clone()),
                    renamed = %renamed,
                    "renaming category on load"
                );
                subcat.name = renamed;
            }
            let _ = category.add_subcat(subcat);
        }
        category
    }
}

fn unique_name(parent: &Category, name: &str) -> String {
    (2..)
        .map(|n| format!("{name} ({n})"))
        .find(|candidate| parent.subcat(candidate).is_none())
        .unwrap_or_else(|| name.to_string())
}

/// Structural equality; identities are ignored.
impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.info == other.info
            && self.metadata == other.metadata
            && self.questions == other.questions
            && self.subcats == other.subcats
    }
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::next(),
            name: name.into(),
            info: FText::default(),
            metadata: BTreeMap::new(),
            questions: Vec::new(),
            subcats: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    /// Rename a detached category. Attached ones are renamed through
    /// [`Category::rename_subcat`] on their parent.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if self.parent.is_some() {
            return false;
        }
        self.name = name.into();
        true
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn questions_mut(&mut self) -> &mut [Question] {
        &mut self.questions
    }

    pub fn subcats(&self) -> &[Category] {
        &self.subcats
    }

    pub fn subcat(&self, name: &str) -> Option<&Category> {
        self.subcats.iter().find(|cat| cat.name == name)
    }

    pub fn subcat_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.subcats.iter_mut().find(|cat| cat.name == name)
    }

    /// Append `question`, handing it back if a question with the same identity is
    /// already here.
    pub fn add_question(&mut self, mut question: Question) -> Result<(), Question> {
        if self.questions.iter().any(|q| q.id == question.id) {
            return Err(question);
        }
        question.parent = Some(self.id);
        self.questions.push(question);
        Ok(())
    }

    pub fn pop_question(&mut self, index: usize) -> Option<Question> {
        if index >= self.questions.len() {
            return None;
        }
        let mut question = self.questions.remove(index);
        question.parent = None;
        Some(question)
    }

    /// Append `child`, handing it back if a sibling already has its name.
    pub fn add_subcat(&mut self, mut child: Category) -> Result<(), Category> {
        if self.subcat(&child.name).is_some() {
            return Err(child);
        }
        child.parent = Some(self.id);
        self.subcats.push(child);
        Ok(())
    }

    pub fn pop_subcat(&mut self, name: &str) -> Option<Category> {
        let index = self.subcats.iter().position(|cat| cat.name == name)?;
        let mut child = self.subcats.remove(index);
        child.parent = None;
        Some(child)
    }

    /// Fails when `old` is missing or another child is already called `new`.
    pub fn rename_subcat(&mut self, old: &str, new: &str) -> bool {
        if old != new && self.subcat(new).is_some() {
            return false;
        }
        match self.subcat_mut(old) {
            Some(child) => {
                child.name = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Descend along a `/`-separated path, creating missing categories.
    pub fn get_or_create_path(&mut self, path: &str) -> &mut Category {
        let mut current = self;
        for part in path.split('/').map(str::trim).filter(|part| !part.is_empty()) {
            let index = match current.subcats.iter().position(|cat| cat.name == part) {
                Some(index) => index,
                None => {
                    let mut child = Category::new(part);
                    child.parent = Some(current.id);
                    current.subcats.push(child);
                    current.subcats.len() - 1
                }
            };
            current = &mut current.subcats[index];
        }
        current
    }

    /// Number of questions, optionally including every sub-category.
    pub fn get_size(&self, recursive: bool) -> usize {
        let own = self.questions.len();
        if !recursive {
            return own;
        }
        own + self.subcats.iter().map(|cat| cat.get_size(true)).sum::<usize>()
    }

    /// Levels in this subtree; a category without children has depth 1.
    pub fn get_depth(&self) -> usize {
        1 + self.subcats.iter().map(Category::get_depth).max().unwrap_or(0)
    }

    /// Every database id in use below (and including) this category.
    pub fn get_dbids(&self) -> BTreeSet<u32> {
        self.walk()
            .flat_map(|(_, cat)| cat.questions.iter().filter_map(|q| q.dbid))
            .collect()
    }

    /// Give every question without a database id the lowest unused one, in pre-order.
    pub fn gen_dbids(&mut self) {
        let mut used = self.get_dbids();
        let mut next = 1;
        self.assign_dbids(&mut used, &mut next);
    }

    fn assign_dbids(&mut self, used: &mut BTreeSet<u32>, next: &mut u32) {
        for question in self.questions.iter_mut().filter(|q| q.dbid.is_none()) {
            while used.contains(next) {
                *next += 1;
            }
            question.dbid = Some(*next);
            used.insert(*next);
        }
        for subcat in &mut self.subcats {
            subcat.assign_dbids(used, next);
        }
    }

    /// Pre-order traversal yielding each category with its `/`-joined path.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(self.name.clone(), self)],
        }
    }

    /// Every file reference in this category and below, in pre-order: category
    /// info first, then each question's [`Question::files_mut`].
    pub fn files_mut(&mut self) -> Vec<&mut FileRef> {
        let mut files: Vec<&mut FileRef> = self.info.files_mut().collect();
        for question in &mut self.questions {
            files.extend(question.files_mut());
        }
        for subcat in &mut self.subcats {
            files.extend(subcat.files_mut());
        }
        files
    }

    /// Questions matching `query`, in pre-order.
    pub fn find<'a>(&'a self, query: &Query) -> Vec<&'a Question> {
        self.walk()
            .flat_map(|(_, cat)| cat.questions.iter())
            .filter(|question| query.matches(question))
            .collect()
    }

    /// Run [`Question::check`] on every question, collecting failures by path.
    pub fn check_all(&self) -> Vec<(String, ModelError)> {
        let mut failures = Vec::new();
        for (path, cat) in self.walk() {
            for question in &cat.questions {
                if let Err(err) = question.check() {
                    failures.push((format!("{path}/{}", question.name), err));
                }
            }
        }
        failures
    }
}

pub struct Walk<'a> {
    stack: Vec<(String, &'a Category)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (String, &'a Category);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, cat) = self.stack.pop()?;
        for child in cat.subcats.iter().rev() {
            self.stack.push((format!("{path}/{}", child.name), child));
        }
        Some((path, cat))
    }
}

/// Filters for [`Category::find`]; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub name: Option<Regex>,
    pub body: Option<Regex>,
    /// Every tag listed here must be present.
    pub tags: BTreeSet<String>,
    pub qtype: Option<QuestionType>,
    pub dbid: Option<u32>,
}

impl Query {
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(name) = &self.name {
            if !name.is_match(&question.name) {
                return false;
            }
        }
        if let Some(body) = &self.body {
            if !body.is_match(&question.body.to_string()) {
                return false;
            }
        }
        if !self.tags.is_subset(&question.tags) {
            return false;
        }
        if self.qtype.is_some_and(|ty| ty != question.question_type()) {
            return false;
        }
        if self.dbid.is_some() && self.dbid != question.dbid {
            return false;
        }
        true
    }
}
