//! Lesson catalog: ordered modules and lookups over them.

use serde::Serialize;

use crate::error::ContentError;
use crate::model::{Lesson, Module};
use crate::progress::ProgressStore;

/// All loaded modules, in display order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: Vec<Module>,
}

/// The lessons either side of a lesson within its module.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentLessons<'a> {
    pub prev: Option<&'a Lesson>,
    pub next: Option<&'a Lesson>,
}

/// Completed versus total lessons for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleCompletion {
    pub completed: usize,
    pub total: usize,
}

impl ModuleCompletion {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl Catalog {
    /// Build a catalog, sorting modules by `order` then slug and each
    /// module's lessons by `order`.
    pub fn new(mut modules: Vec<Module>) -> Self {
        modules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.slug.cmp(&b.slug)));
        for module in &mut modules {
            module.lessons.sort_by_key(|l| l.order);
        }
        Self { modules }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, slug: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.slug == slug)
    }

    pub fn lesson(&self, module: &str, lesson: &str) -> Option<&Lesson> {
        self.module(module)?.lessons.iter().find(|l| l.slug == lesson)
    }

    /// Look up a lesson, reporting which part was missing.
    pub fn resolve(&self, module: &str, lesson: &str) -> Result<(&Module, &Lesson), ContentError> {
        let m = self
            .module(module)
            .ok_or_else(|| ContentError::ModuleNotFound(module.to_string()))?;
        let l = m
            .lessons
            .iter()
            .find(|l| l.slug == lesson)
            .ok_or_else(|| ContentError::LessonNotFound {
                module: module.to_string(),
                lesson: lesson.to_string(),
            })?;
        Ok((m, l))
    }

    /// Previous and next lessons in the same module. Both are `None` when
    /// the lesson is unknown.
    pub fn adjacent_lessons(&self, module: &str, lesson: &str) -> AdjacentLessons<'_> {
        let Some(m) = self.module(module) else {
            return AdjacentLessons::default();
        };
        let Some(idx) = m.lessons.iter().position(|l| l.slug == lesson) else {
            return AdjacentLessons::default();
        };
        AdjacentLessons {
            prev: idx.checked_sub(1).and_then(|i| m.lessons.get(i)),
            next: m.lessons.get(idx + 1),
        }
    }

    /// Every lesson of every published module, in display order.
    pub fn published_lessons(&self) -> impl Iterator<Item = (&Module, &Lesson)> {
        self.modules
            .iter()
            .filter(|m| !m.coming_soon)
            .flat_map(|m| m.lessons.iter().map(move |l| (m, l)))
    }

    /// Completion over the module's catalog lessons. `None` for an unknown module.
    pub fn module_completion(
        &self,
        module: &str,
        store: &dyn ProgressStore,
    ) -> Option<ModuleCompletion> {
        let m = self.module(module)?;
        let completed = m
            .lessons
            .iter()
            .filter(|l| store.is_lesson_complete(&m.slug, &l.slug))
            .count();
        Some(ModuleCompletion {
            completed,
            total: m.lessons.len(),
        })
    }
}
