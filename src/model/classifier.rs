use std::io::Cursor;

use image::ImageFormat;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::PredictError;
use crate::triage::{ClassProbabilities, LocationCode, PredictionResult, Sex};

// Client for the remote lesion classifier
pub struct Classifier {
    predict_url: String,
    client: Client,
}

impl Classifier {
    pub fn new(predict_url: impl Into<String>, client: Client) -> Self {
        let predict_url = predict_url.into();
        info!("Using lesion classifier at: {}", predict_url);
        Self { predict_url, client }
    }

    /// Send one image plus patient metadata to the classifier.
    ///
    /// The upload is always re-encoded as PNG. A single attempt is made; the
    /// caller decides how to surface a failure.
    pub async fn predict(
        &self,
        image: &[u8],
        age: u32,
        sex: Sex,
        location: LocationCode,
    ) -> Result<PredictionResult, PredictError> {
        let png = encode_png(image.to_vec()).await?;
        debug!("Encoded upload as PNG ({} bytes)", png.len());

        let file = Part::bytes(png)
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .part("file", file)
            .text("age", age.to_string())
            .text("sex", sex.as_str())
            .text("body_location", location.as_str());

        info!(
            "Requesting prediction (age: {}, sex: {}, location: {})",
            age, sex, location
        );
        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PredictError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Prediction response: {}", body);
        parse_prediction(&body)
    }
}

/// Decode whatever the user uploaded and re-encode it as PNG.
async fn encode_png(image: Vec<u8>) -> Result<Vec<u8>, PredictError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, PredictError> {
        let decoded = image::load_from_memory(&image)?;
        let mut png = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    })
    .await?
}

/// Parse a classifier body: a flat JSON object of class code to probability.
pub fn parse_prediction(body: &str) -> Result<PredictionResult, PredictError> {
    let Value::Object(map) = serde_json::from_str::<Value>(body)? else {
        return Err(PredictError::Malformed("expected a JSON object of class probabilities"));
    };
    let probabilities = ClassProbabilities::new(map);
    let top_class = probabilities
        .top_class()
        .ok_or(PredictError::Malformed("no numeric class probabilities in response"))?
        .to_string();
    Ok(PredictionResult {
        top_class,
        probabilities,
    })
}
