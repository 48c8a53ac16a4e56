// Page grouping - folds consecutive same-collaborator pages into groups
use std::path::PathBuf;

use crate::types::{PageGroup, RecognizedPage};

/// Where the open group stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrouperState {
    /// No collaborator seen since the group opened
    Empty,
    /// Accumulating pages for one collaborator
    Keyed,
}

/// Per-document state machine. Feed pages in ascending order with [`push`],
/// then call [`finish`] to flush the trailing group.
///
/// [`push`]: PageGrouper::push
/// [`finish`]: PageGrouper::finish
#[derive(Debug)]
pub struct PageGrouper {
    source_file: PathBuf,
    current: PageGroup,
    last_page: Option<u32>,
}

impl PageGrouper {
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        let source_file = source_file.into();
        Self {
            current: PageGroup::new(source_file.clone()),
            source_file,
            last_page: None,
        }
    }

    pub fn state(&self) -> GrouperState {
        if self.current.is_keyed() {
            GrouperState::Keyed
        } else {
            GrouperState::Empty
        }
    }

    /// The group still being accumulated.
    pub fn current(&self) -> &PageGroup {
        &self.current
    }

    /// Add one page. Returns the previous group when this page starts a new one.
    ///
    /// A page without a collaborator inherits the open group's key, so
    /// continuation sheets stay with the page they follow.
    pub fn push(&mut self, page_number: u32, page: &RecognizedPage) -> Option<PageGroup> {
        debug_assert!(
            self.last_page.map_or(true, |last| last < page_number),
            "pages must arrive in ascending order"
        );
        self.last_page = Some(page_number);

        let key = if page.collaborator_key.is_empty() && self.current.is_keyed() {
            self.current.key().to_string()
        } else {
            page.collaborator_key.clone()
        };

        let mut closed = None;
        if self.current.is_keyed() && key != self.current.key() {
            let fresh = PageGroup::new(self.source_file.clone());
            closed = Some(std::mem::replace(&mut self.current, fresh));
        }

        if !page.company.is_empty() {
            self.current.set_sub_path(&page.company);
        }
        if !key.is_empty() {
            self.current.set_key(&key);
        }
        self.current.push_page(page_number);

        closed
    }

    /// Close the document. The trailing group is always returned, even with no key.
    pub fn finish(self) -> PageGroup {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(company: &str, key: &str) -> RecognizedPage {
        RecognizedPage::new(company, key)
    }

    /// Run a whole document through a grouper, collecting every emitted group.
    fn run(pages: &[(u32, RecognizedPage)]) -> Vec<PageGroup> {
        let mut grouper = PageGrouper::new("batch.pdf");
        let mut groups = Vec::new();
        for (number, recognized) in pages {
            groups.extend(grouper.push(*number, recognized));
        }
        groups.push(grouper.finish());
        groups
    }

    #[test]
    fn starts_empty_and_becomes_keyed() {
        let mut grouper = PageGrouper::new("batch.pdf");
        assert_eq!(grouper.state(), GrouperState::Empty);

        assert!(grouper.push(1, &page("", "")).is_none());
        assert_eq!(grouper.state(), GrouperState::Empty);

        assert!(grouper.push(2, &page("Acme", "Jane")).is_none());
        assert_eq!(grouper.state(), GrouperState::Keyed);
        assert_eq!(grouper.current().pages(), &[1, 2]);
    }

    #[test]
    fn blank_page_carries_the_key_forward() {
        let groups = run(&[
            (1, page("Acme Corp", "Jane Doe")),
            (2, page("", "")),
            (3, page("Acme Corp", "John Smith")),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), "Jane Doe");
        assert_eq!(groups[0].sub_path(), "Acme Corp");
        assert_eq!(groups[0].pages(), &[1, 2]);
        assert_eq!(groups[1].key(), "John Smith");
        assert_eq!(groups[1].pages(), &[3]);
    }

    #[test]
    fn key_change_closes_before_adding() {
        let mut grouper = PageGrouper::new("batch.pdf");
        grouper.push(1, &page("Acme", "Jane"));
        let closed = grouper.push(2, &page("Acme", "John")).expect("split on new key");

        assert_eq!(closed.pages(), &[1]);
        assert_eq!(closed.key(), "Jane");
        assert_eq!(grouper.current().pages(), &[2]);
        assert_eq!(grouper.current().key(), "John");
    }

    #[test]
    fn new_group_resets_sub_path() {
        let groups = run(&[(1, page("Acme", "Jane")), (2, page("", "John"))]);
        assert_eq!(groups[1].sub_path(), "");
        assert_eq!(groups[1].source_file(), groups[0].source_file());
    }

    #[test]
    fn latest_company_wins_within_a_group() {
        let groups = run(&[
            (1, page("Acme", "Jane")),
            (2, page("Acme Holdings", "Jane")),
            (3, page("", "")),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sub_path(), "Acme Holdings");
    }

    #[test]
    fn document_without_identifiers_yields_one_unkeyed_group() {
        let groups = run(&[(1, page("", "")), (2, page("", "")), (3, page("", ""))]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), "");
        assert_eq!(groups[0].pages(), &[1, 2, 3]);
    }

    #[test]
    fn leading_blank_pages_join_the_first_collaborator() {
        let groups = run(&[(1, page("", "")), (2, page("Acme", "Jane")), (3, page("", ""))]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), "Jane");
        assert_eq!(groups[0].pages(), &[1, 2, 3]);
    }

    #[test]
    fn skipped_pages_leave_gaps_without_splitting() {
        let groups = run(&[
            (1, page("Acme", "Jane")),
            (2, page("", "")),
            (4, page("", "")),
            (5, page("", "")),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pages(), &[1, 2, 4, 5]);
    }

    #[test]
    fn every_page_lands_in_exactly_one_group() {
        let names = ["Ana", "Ana", "", "Bruno", "", "", "Carla", "Ana", ""];
        let pages: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (i as u32 + 1, page("Acme", name)))
            .collect();

        let groups = run(&pages);
        let flattened: Vec<u32> = groups.iter().flat_map(|g| g.pages().to_vec()).collect();
        assert_eq!(flattened, (1..=names.len() as u32).collect::<Vec<_>>());

        let keys: Vec<&str> = groups.iter().map(|g| g.key()).collect();
        assert_eq!(keys, ["Ana", "Bruno", "Carla", "Ana"]);
        for group in &groups {
            assert!(group.pages().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
