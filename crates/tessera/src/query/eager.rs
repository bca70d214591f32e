use super::{Constraint, Query};
use crate::{relation, Instance, Result};

use std::rc::Rc;

impl<'a> Query<'a> {
    /// Load a relation with the results.
    ///
    /// `path` names a relation field. Nested relations are reached with dots
    /// (`"posts.comments"`), sibling relations in one segment are separated
    /// by `|` (`"posts|profile"`), and `*` stands for every relation of the
    /// model at that level.
    pub fn with(mut self, path: &str) -> Self {
        self.add_eager(path, None);
        self
    }

    /// Load a relation, adjusting the related sub-query. For nested paths the
    /// constraint applies to the last segment.
    pub fn with_constraint(
        mut self,
        path: &str,
        constraint: impl Fn(Query<'a>) -> Query<'a> + 'a,
    ) -> Self {
        self.add_eager(path, Some(Rc::new(constraint)));
        self
    }

    /// Load every relation declared on the model.
    pub fn with_all(mut self) -> Self {
        for name in self.relation_names() {
            self.eager.entry(name).or_default();
        }
        self
    }

    /// Load every relation, and every relation of the related models, `depth`
    /// levels further down.
    pub fn with_all_recursive(mut self, depth: usize) -> Self {
        for name in self.relation_names() {
            let nested: Constraint<'a> = Rc::new(move |query: Query<'a>| match depth {
                0 => query.with_all(),
                depth => query.with_all_recursive(depth - 1),
            });
            self.eager.entry(name).or_default().push(nested);
        }
        self
    }

    pub(crate) fn add_eager(&mut self, path: &str, constraint: Option<Constraint<'a>>) {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest.to_string())),
            None => (path, None),
        };

        let names: Vec<String> = if head.trim() == "*" {
            self.relation_names()
        } else {
            head.split('|')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        };

        for name in names {
            let constraints = self.eager.entry(name).or_default();

            match &rest {
                Some(rest) => {
                    let rest = rest.clone();
                    let constraint = constraint.clone();
                    constraints.push(Rc::new(move |mut query: Query<'a>| {
                        query.add_eager(&rest, constraint.clone());
                        query
                    }));
                }
                None => constraints.extend(constraint.clone()),
            }
        }
    }

    /// Resolve every requested relation on an already selected batch.
    pub(crate) fn load(&self, items: &mut [Instance]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        for (name, constraints) in &self.eager {
            relation::load(self.cx, self.model, items, name, constraints)?;
        }

        Ok(())
    }

    fn relation_names(&self) -> Vec<String> {
        self.model
            .relations()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}
