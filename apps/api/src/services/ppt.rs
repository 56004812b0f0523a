//! Document (PPT) generation.
//!
//! `generate` is the asynchronous path: submit a job, then poll until every
//! rendering stage reports done. Outline creation and template listing are
//! plain signed calls with no job cycle.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::services::{Artifact, TextCapability};
use crate::vendor::envelope::string_at;
use crate::vendor::job::{Job, JobClient, JobOptions, Stage, StageState};
use crate::vendor::polling::{join_stages, PollingEngine, Progress, StageJoin};
use crate::vendor::transport::{FormField, RequestBody};
use crate::vendor::VendorError;

const OUTLINE_PATH: &str = "createOutline";
const OUTLINE_BY_DOC_PATH: &str = "createOutlineByDoc";
const PPT_BY_OUTLINE_PATH: &str = "createPptByOutline";
const TEMPLATE_LIST_PATH: &str = "template/list";

const CONTENT_STAGE: &str = "pptStatus";
const IMAGE_STAGE: &str = "aiImageStatus";
const NOTES_STAGE: &str = "cardNoteStatus";
const STATUS_SUFFIX: &str = "Status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiImageMode {
    /// Roughly a fifth of content pages illustrated.
    Normal,
    /// Roughly half of content pages illustrated.
    Advanced,
}

impl AiImageMode {
    fn as_str(self) -> &'static str {
        match self {
            AiImageMode::Normal => "normal",
            AiImageMode::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PptOptions {
    /// Generate speaker notes.
    pub card_note: bool,
    /// Let the vendor augment the text with a web search.
    pub search: bool,
    /// Auto-illustrate slides.
    pub figure: bool,
    pub ai_image: AiImageMode,
    pub template_id: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
}

impl Default for PptOptions {
    fn default() -> Self {
        Self {
            card_note: true,
            search: false,
            figure: true,
            ai_image: AiImageMode::Normal,
            template_id: None,
            author: None,
            language: None,
        }
    }
}

impl PptOptions {
    fn job_options(&self) -> JobOptions {
        let mut options = JobOptions::new()
            .flag("isCardNote", self.card_note)
            .flag("search", self.search)
            .flag("isFigure", self.figure);
        if self.figure {
            options = options.choice("aiImage", self.ai_image.as_str());
        }
        if let Some(template_id) = &self.template_id {
            options = options.choice("templateId", template_id.as_str());
        }
        if let Some(author) = &self.author {
            options = options.choice("author", author.as_str());
        }
        if let Some(language) = &self.language {
            options = options.choice("language", language.as_str());
        }
        options
    }

    fn extend_json(&self, body: &mut Map<String, Value>) {
        body.insert("isCardNote".into(), json!(self.card_note));
        body.insert("search".into(), json!(self.search));
        body.insert("isFigure".into(), json!(self.figure));
        if self.figure {
            body.insert("aiImage".into(), json!(self.ai_image.as_str()));
        }
        if let Some(template_id) = &self.template_id {
            body.insert("templateId".into(), json!(template_id));
        }
        if let Some(author) = &self.author {
            body.insert("author".into(), json!(author));
        }
        if let Some(language) = &self.language {
            body.insert("language".into(), json!(language));
        }
    }

    /// Stages that must report done before the deck URL is usable, whether or
    /// not the vendor has mentioned them yet. Stages it does report are joined
    /// on top of these.
    pub fn required_stages(&self) -> Vec<&'static str> {
        let mut stages = vec![CONTENT_STAGE];
        if self.figure {
            stages.push(IMAGE_STAGE);
        }
        if self.card_note {
            stages.push(NOTES_STAGE);
        }
        stages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutlineOptions {
    pub language: String,
    pub search: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            language: "cn".to_string(),
            search: false,
        }
    }
}

/// Source document for outline extraction.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Upload { file_name: String, bytes: Bytes },
    Remote { file_name: String, url: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateQuery {
    pub pay_type: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub industry: Option<String>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
}

fn stage_state(raw: &str) -> StageState {
    match raw {
        "done" => StageState::Done,
        "" | "init" | "pending" | "waiting" => StageState::Pending,
        s if s.contains("fail") => StageState::Failed,
        _ => StageState::Running,
    }
}

/// Maps a progress `data` object to a polling observation. The stages joined
/// are the `required` ones plus every `*Status` field the vendor reports, so a
/// stage that was not requested still blocks completion while it is running.
/// A required stage the vendor has not reported yet counts as pending.
pub fn parse_progress(required: &[&str], data: &Value) -> Result<Progress<Artifact>, VendorError> {
    let Some(fields) = data.as_object() else {
        return Err(VendorError::Parse("progress data is not an object".into()));
    };

    let mut names: Vec<&str> = required.to_vec();
    for (name, value) in fields {
        if name.ends_with(STATUS_SUFFIX) && value.is_string() && !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }

    let stages = names
        .into_iter()
        .map(|name| Stage {
            name: name.to_string(),
            state: fields
                .get(name)
                .and_then(Value::as_str)
                .map(stage_state)
                .unwrap_or(StageState::Pending),
        })
        .collect();

    Ok(match join_stages(stages) {
        StageJoin::Pending => Progress::Pending,
        StageJoin::Running(stages) => Progress::Running(stages),
        StageJoin::Failed(reason) => match data.get("errMsg").and_then(Value::as_str) {
            Some(detail) if !detail.is_empty() => Progress::Failed(format!("{reason}: {detail}")),
            _ => Progress::Failed(reason),
        },
        StageJoin::Done => Progress::Done(Artifact::Url(string_at(data, "/pptUrl")?.to_string())),
    })
}

pub struct DocumentGenerationFacade {
    jobs: JobClient,
    engine: PollingEngine,
    defaults: PptOptions,
}

impl DocumentGenerationFacade {
    pub fn new(jobs: JobClient, engine: PollingEngine) -> Self {
        Self {
            jobs,
            engine,
            defaults: PptOptions::default(),
        }
    }

    /// Submits a generation job and waits for the finished deck URL.
    pub async fn generate(&self, text: &str, options: &PptOptions) -> Result<Artifact, VendorError> {
        let job = self.jobs.submit(text, &options.job_options()).await?;
        self.await_deck(job, options).await
    }

    /// Turns a previously created outline into a deck and waits for it.
    pub async fn generate_from_outline(
        &self,
        text: &str,
        outline: &Value,
        options: &PptOptions,
    ) -> Result<Artifact, VendorError> {
        let job = self.create_ppt_by_outline(text, outline, options).await?;
        self.await_deck(job, options).await
    }

    /// Signed JSON submission of an outline. Returns the job without polling.
    pub async fn create_ppt_by_outline(
        &self,
        text: &str,
        outline: &Value,
        options: &PptOptions,
    ) -> Result<Job, VendorError> {
        let mut body = Map::new();
        body.insert("query".into(), json!(text));
        body.insert("outline".into(), outline.clone());
        options.extend_json(&mut body);
        self.jobs
            .submit_body(PPT_BY_OUTLINE_PATH, RequestBody::Json(Value::Object(body)))
            .await
    }

    /// Synchronous outline generation from free text.
    pub async fn create_outline(
        &self,
        text: &str,
        options: &OutlineOptions,
    ) -> Result<Value, VendorError> {
        let body = json!({
            "query": text,
            "language": options.language,
            "search": options.search,
        });
        self.jobs
            .call(
                Method::POST,
                self.jobs.endpoint(OUTLINE_PATH)?,
                RequestBody::Json(body),
            )
            .await
    }

    /// Synchronous outline generation from an uploaded or linked document.
    pub async fn create_outline_by_doc(
        &self,
        text: &str,
        document: DocumentSource,
        options: &OutlineOptions,
    ) -> Result<Value, VendorError> {
        let mut fields = vec![
            FormField::text("query", text),
            FormField::text("language", options.language.as_str()),
            FormField::text("search", options.search.to_string()),
        ];
        match document {
            DocumentSource::Upload { file_name, bytes } => {
                fields.push(FormField::text("fileName", file_name.as_str()));
                fields.push(FormField::file(
                    "file",
                    &file_name,
                    "application/octet-stream",
                    bytes,
                ));
            }
            DocumentSource::Remote { file_name, url } => {
                fields.push(FormField::text("fileName", file_name));
                fields.push(FormField::text("fileUrl", url));
            }
        }
        self.jobs
            .call(
                Method::POST,
                self.jobs.endpoint(OUTLINE_BY_DOC_PATH)?,
                RequestBody::Form(fields),
            )
            .await
    }

    /// Template catalogue lookup.
    pub async fn list_templates(&self, query: &TemplateQuery) -> Result<Value, VendorError> {
        let mut url = self.jobs.endpoint(TEMPLATE_LIST_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(pay_type) = &query.pay_type {
                pairs.append_pair("payType", pay_type);
            }
            if let Some(style) = &query.style {
                pairs.append_pair("style", style);
            }
            if let Some(color) = &query.color {
                pairs.append_pair("color", color);
            }
            if let Some(industry) = &query.industry {
                pairs.append_pair("industry", industry);
            }
            pairs.append_pair("pageNum", &query.page_num.unwrap_or(1).to_string());
            pairs.append_pair("pageSize", &query.page_size.unwrap_or(10).to_string());
        }
        self.jobs.call(Method::GET, url, RequestBody::Empty).await
    }

    async fn await_deck(&self, mut job: Job, options: &PptOptions) -> Result<Artifact, VendorError> {
        let required = options.required_stages();
        let artifact = self
            .engine
            .await_completion(&mut job, &self.jobs, |data| parse_progress(&required, data))
            .await?;
        info!("Deck for job {} is ready", job.id());
        Ok(artifact)
    }
}

#[async_trait]
impl TextCapability for DocumentGenerationFacade {
    async fn run(&self, text: &str) -> Result<Artifact, VendorError> {
        self.generate(text, &self.defaults).await
    }
}
