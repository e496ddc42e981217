use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::triage::{parse_age, PatientInput, Sex};

/// Raw fields of a submitted scan form, before validation.
#[derive(Debug, Default)]
pub struct ScanForm {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub body_location: Option<String>,
    pub lifestyle_work: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl ScanForm {
    /// Record one text field. Unrecognised names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "age" => self.age = Some(value),
            "sex" => self.sex = Some(value),
            "body_location" => self.body_location = Some(value),
            "lifestyle_work" => self.lifestyle_work = Some(value),
            _ => {}
        }
    }

    pub fn into_input(self) -> Result<PatientInput, FormError> {
        let age = parse_age(&self.age.ok_or(FormError::MissingField("age"))?)?;
        let sex: Sex = self.sex.ok_or(FormError::MissingField("sex"))?.parse()?;
        let body_location = self
            .body_location
            .ok_or(FormError::MissingField("body_location"))?;
        let image = self.image.ok_or(FormError::MissingField("file"))?;
        if image.is_empty() {
            return Err(FormError::EmptyImage);
        }
        match image::guess_format(&image) {
            Ok(image::ImageFormat::Png) | Ok(image::ImageFormat::Jpeg) => {}
            _ => return Err(FormError::UnsupportedImage),
        }

        PatientInput::new(
            age,
            sex,
            body_location,
            self.lifestyle_work.unwrap_or_default(),
            image,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}
