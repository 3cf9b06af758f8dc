use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::models::CourseRecord;

/// Default number of rows returned by a course listing
pub const DEFAULT_LISTING_LIMIT: usize = 100;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read course data from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed course data in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate course id in catalog: {0}")]
    DuplicateId(String),
}

/// In-memory course table, loaded once at startup and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: Vec<CourseRecord>,
}

impl CourseCatalog {
    /// Loads the catalog from a JSON array of course records
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path_str.clone(),
            source,
        })?;

        let courses: Vec<CourseRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| CatalogError::Parse {
                path: path_str.clone(),
                source,
            })?;

        let catalog = Self::from_records(courses)?;
        tracing::info!(path = %path_str, courses = catalog.len(), "Course catalog loaded");

        Ok(catalog)
    }

    /// Builds a catalog from already-parsed records, keeping their order
    pub fn from_records(courses: Vec<CourseRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(courses.len());
        for course in &courses {
            if !seen.insert(course.course_id.as_str()) {
                return Err(CatalogError::DuplicateId(course.course_id.clone()));
            }
        }

        Ok(Self { courses })
    }

    /// Courses whose id is in `ids`, in catalog order
    ///
    /// `None` selects the whole catalog.
    pub fn filter_by_ids(&self, ids: Option<&HashSet<String>>) -> Vec<&CourseRecord> {
        match ids {
            Some(ids) => self
                .courses
                .iter()
                .filter(|course| ids.contains(&course.course_id))
                .collect(),
            None => self.courses.iter().collect(),
        }
    }

    /// The first `limit` courses in catalog order
    pub fn all(&self, limit: usize) -> &[CourseRecord] {
        &self.courses[..limit.min(self.courses.len())]
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn course(id: &str) -> CourseRecord {
        CourseRecord {
            course_id: id.to_string(),
            title: format!("Course {}", id),
            description: Some("desc".to_string()),
            tags: Some("tag".to_string()),
            category: Some("cat".to_string()),
            duration: "2 weeks".to_string(),
            difficulty_level: "Beginner".to_string(),
            rating: Some(3.5),
        }
    }

    fn catalog() -> CourseCatalog {
        CourseCatalog::from_records(vec![course("C1"), course("C2"), course("C3")]).unwrap()
    }

    fn ids(catalog: &[&CourseRecord]) -> Vec<String> {
        catalog.iter().map(|c| c.course_id.clone()).collect()
    }

    #[test]
    fn test_filter_by_ids_preserves_catalog_order() {
        let catalog = catalog();
        let wanted: HashSet<String> = ["C3", "C1"].iter().map(|s| s.to_string()).collect();

        assert_eq!(ids(&catalog.filter_by_ids(Some(&wanted))), vec!["C1", "C3"]);
    }

    #[test]
    fn test_filter_without_ids_returns_everything() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.filter_by_ids(None)), vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_filter_with_unknown_ids_is_empty() {
        let catalog = catalog();
        let wanted: HashSet<String> = ["C404".to_string()].into_iter().collect();
        assert!(catalog.filter_by_ids(Some(&wanted)).is_empty());
    }

    #[test]
    fn test_all_is_bounded_by_limit() {
        let catalog = catalog();
        assert!(catalog.all(0).is_empty());
        assert_eq!(catalog.all(2).len(), 2);
        assert_eq!(catalog.all(2)[1].course_id, "C2");
        assert_eq!(catalog.all(500).len(), 3);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = CourseCatalog::from_records(vec![course("C1"), course("C1")]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "C1"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = CourseCatalog::load("/definitely/not/here/courses.json");
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let path = std::env::temp_dir().join(format!("courses-{}.json", uuid::Uuid::new_v4()));
        let mut file = File::create(&path).unwrap();
        file.write_all(b"[{\"CourseID\": \"C1\"").unwrap();

        let result = CourseCatalog::load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_load_reads_records_in_order() {
        let path = std::env::temp_dir().join(format!("courses-{}.json", uuid::Uuid::new_v4()));
        let json = serde_json::to_string(&vec![course("C2"), course("C1")]).unwrap();
        std::fs::write(&path, json).unwrap();

        let catalog = CourseCatalog::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ids(&catalog.filter_by_ids(None)), vec!["C2", "C1"]);
    }
}
