use serde::{Deserialize, Deserializer, Serialize};

/// A course as stored in the static catalog file
///
/// Field names follow the catalog's column names. `Description`, `Tags` and
/// `Category` may be missing from a record; they are substituted with empty
/// text during feature assembly and reported as `null` to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRecord {
    #[serde(rename = "CourseID", deserialize_with = "string_or_number")]
    pub course_id: String,
    #[serde(rename = "CourseTitle")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "DifficultyLevel")]
    pub difficulty_level: String,
    #[serde(rename = "CourseRating", default)]
    pub rating: Option<f64>,
}

impl CourseRecord {
    /// The course rating, or `None` when the catalog has no usable value
    pub fn rating(&self) -> Option<f64> {
        self.rating.filter(|rating| rating.is_finite())
    }
}

/// Public projection of a course, used by the course listing and as the
/// `course_profile` payload of a recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseInfo {
    #[serde(rename = "CourseID", deserialize_with = "string_or_number")]
    pub course_id: String,
    #[serde(rename = "CourseTitle")]
    pub course_title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "DifficultyLevel")]
    pub difficulty_level: String,
}

impl From<&CourseRecord> for CourseInfo {
    fn from(course: &CourseRecord) -> Self {
        Self {
            course_id: course.course_id.clone(),
            course_title: course.title.clone(),
            description: course.description.clone().unwrap_or_default(),
            duration: course.duration.clone(),
            difficulty_level: course.difficulty_level.clone(),
        }
    }
}

/// Course IDs show up as both JSON strings and numbers; both become strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Integer(id) => id.to_string(),
        RawId::Float(id) => id.to_string(),
    })
}
