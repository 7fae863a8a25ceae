//! The résumé extraction prompt and the fixed CSV schema.
//!
//! The prompt and the column list describe the same record, so they live
//! together: adding a field means editing the JSON template below, the
//! [`RESUME_COLUMNS`] list and [`crate::output::ResumeRecord`].

/// Default instruction sent alongside every résumé image.
///
/// Used when `ExtractConfig::system_prompt` is `None`.
pub const RESUME_EXTRACTION_PROMPT: &str = r#"Analyze this resume image and extract all information in the following JSON structure:

{
    "name": "",
    "email": "",
    "number": ""(it should contain particular format like +91-XXXXXXXXXX),
    "education": "",
    "work_experience":"",
    "projects":"",
    "certifications": "",
    "skills":""
}

Please extract ALL information visible in the resume and return ONLY the JSON object with no additional text.
If a field is not present in the resume, leave it empty or as an empty array.
For 'number', extract the phone number.
For 'work_experience', include internships and job experiences."#;

/// CSV header, in output order. `filename` is supplied locally; the other
/// eight come from the model.
pub const RESUME_COLUMNS: [&str; 9] = [
    "filename",
    "name",
    "email",
    "number",
    "education",
    "work_experience",
    "projects",
    "certifications",
    "skills",
];
