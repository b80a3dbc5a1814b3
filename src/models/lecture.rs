use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub code: String,
    pub capacity: u32,
    pub room_type: String,
    pub status: String,
    pub floor: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureDate {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub subject_name: String,
    pub professor_id: String,
    pub date: LectureDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<Professor>,
    pub room_id: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    pub start_time: String,
    pub end_time: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Lecture {
    /// Professor name when the lecture was fetched with its professor embedded.
    pub fn professor_name(&self) -> Option<&str> {
        self.professor.as_ref().map(|p| p.name.as_str())
    }

    pub fn room_code(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.code.as_str())
    }
}
