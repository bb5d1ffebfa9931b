use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub course_code: String,
    pub school: School,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub course_rating: Option<i64>,
    pub professor_rating: Option<i64>,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// A syllabus with its course, school, professor and ratings resolved.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    pub id: String,
    pub year: i64,
    pub term: String,
    pub file_url: Option<String>,
    pub text_content: Option<String>,
    pub created_at: i64,
    pub course: Course,
    pub professor: Professor,
    pub ratings: Vec<Rating>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_camel_case() {
        let syllabus = Syllabus {
            id: "s1".to_string(),
            year: 2024,
            term: "Fall".to_string(),
            file_url: None,
            text_content: Some("Week 1".to_string()),
            created_at: 1,
            course: Course {
                id: "c1".to_string(),
                name: "Intro to Algorithms".to_string(),
                course_code: "6.006".to_string(),
                school: School {
                    id: "sc1".to_string(),
                    name: "MIT".to_string(),
                },
            },
            professor: Professor {
                id: "p1".to_string(),
                name: "A. Turing".to_string(),
            },
            ratings: vec![Rating {
                id: "r1".to_string(),
                course_rating: Some(5),
                professor_rating: None,
                comment: None,
                created_at: 1,
            }],
        };

        let json = serde_json::to_value(&syllabus).unwrap();
        assert_eq!(json["course"]["courseCode"], "6.006");
        assert_eq!(json["course"]["school"]["name"], "MIT");
        assert_eq!(json["fileUrl"], serde_json::Value::Null);
        assert_eq!(json["ratings"][0]["courseRating"], 5);
        assert_eq!(
            json["ratings"][0]["professorRating"],
            serde_json::Value::Null
        );
    }
}
