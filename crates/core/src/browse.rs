//! Browse-page search and filtering.
//!
//! The browse endpoint fetches every active wishlist once and filters in
//! memory. Text search is a case-insensitive substring match over the title,
//! teacher name and school; location and grade must match exactly (ignoring
//! case).

use serde::Deserialize;

/// Fields a wishlist listing exposes to the filter.
pub trait Listing {
    fn title(&self) -> &str;
    fn teacher_name(&self) -> &str;
    fn school(&self) -> &str;
    fn location(&self) -> Option<&str>;
    fn grade(&self) -> Option<&str>;
    fn teacher_verified(&self) -> bool;
}

/// Query-string filter for `GET /api/wishlists`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseFilter {
    /// Free-text search.
    #[serde(default, rename = "q")]
    pub query: Option<String>,
    /// Island or town.
    #[serde(default)]
    pub location: Option<String>,
    /// Grade level.
    #[serde(default)]
    pub grade: Option<String>,
    /// Only show verified teachers.
    #[serde(default, rename = "verified")]
    pub verified_only: bool,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl BrowseFilter {
    /// Whether `listing` passes every active criterion.
    #[must_use]
    pub fn matches<L: Listing + ?Sized>(&self, listing: &L) -> bool {
        if self.verified_only && !listing.teacher_verified() {
            return false;
        }

        if let Some(location) = non_blank(self.location.as_ref()) {
            if !listing
                .location()
                .is_some_and(|l| l.trim().eq_ignore_ascii_case(location))
            {
                return false;
            }
        }

        if let Some(grade) = non_blank(self.grade.as_ref()) {
            if !listing
                .grade()
                .is_some_and(|g| g.trim().eq_ignore_ascii_case(grade))
            {
                return false;
            }
        }

        if let Some(query) = non_blank(self.query.as_ref()) {
            let needle = query.to_lowercase();
            return [listing.title(), listing.teacher_name(), listing.school()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }

        true
    }

    /// Keep only matching listings, preserving order.
    #[must_use]
    pub fn apply<L: Listing>(&self, listings: Vec<L>) -> Vec<L> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        title: &'static str,
        teacher: &'static str,
        school: &'static str,
        location: Option<&'static str>,
        grade: Option<&'static str>,
        verified: bool,
    }

    impl Listing for Row {
        fn title(&self) -> &str {
            self.title
        }
        fn teacher_name(&self) -> &str {
            self.teacher
        }
        fn school(&self) -> &str {
            self.school
        }
        fn location(&self) -> Option<&str> {
            self.location
        }
        fn grade(&self) -> Option<&str> {
            self.grade
        }
        fn teacher_verified(&self) -> bool {
            self.verified
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                title: "Reading corner",
                teacher: "Ms. Rolle",
                school: "Sadie Curtis Primary",
                location: Some("Nassau"),
                grade: Some("2"),
                verified: true,
            },
            Row {
                title: "Science kits",
                teacher: "Mr. Knowles",
                school: "Eight Mile Rock High",
                location: Some("Grand Bahama"),
                grade: Some("10"),
                verified: false,
            },
        ]
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert_eq!(BrowseFilter::default().apply(rows()).len(), 2);
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let filter = BrowseFilter {
            query: Some("SCIENCE".into()),
            ..Default::default()
        };
        let result = filter.apply(rows());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].teacher, "Mr. Knowles");

        let filter = BrowseFilter {
            query: Some("sadie".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(rows()).len(), 1);
    }

    #[test]
    fn test_location_and_grade_exact() {
        let filter = BrowseFilter {
            location: Some("nassau".into()),
            grade: Some("2".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(rows()).len(), 1);

        let filter = BrowseFilter {
            grade: Some("1".into()),
            ..Default::default()
        };
        assert!(filter.apply(rows()).is_empty());
    }

    #[test]
    fn test_verified_only() {
        let filter = BrowseFilter {
            verified_only: true,
            ..Default::default()
        };
        let result = filter.apply(rows());
        assert_eq!(result.len(), 1);
        assert!(result[0].verified);
    }

    #[test]
    fn test_blank_criteria_are_ignored() {
        let filter = BrowseFilter {
            query: Some("  ".into()),
            location: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.apply(rows()).len(), 2);
    }
}
