use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::{self, Report};
use crate::config::Config;
use crate::magick::BackgroundOptions;
use crate::paths::normalize_path;
use crate::pdf::stamp::ImagePlacement;
use crate::pdf::PdfDocument;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file (Windows paths are accepted)")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files or directories of PDFs, merged in order (at least two files)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path (default: <first>_merged.pdf in the output subdirectory)")]
    pub output: Option<String>,
    #[schemars(description = "Overwrite an existing output file (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfPagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Comma-separated 1-based page numbers, e.g. '3,1,2'")]
    pub pages: String,
    #[schemars(description = "Output file path (default: derived from the input)")]
    pub output: Option<String>,
    #[schemars(description = "Overwrite an existing output file (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfInsertDateRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Date format: us, eu, iso or long (default: us)")]
    pub format: Option<String>,
    #[schemars(description = "'all' or comma-separated 1-based pages (default: last page)")]
    pub pages: Option<String>,
    #[schemars(description = "Left edge in points (default: 50)")]
    pub x: Option<f32>,
    #[schemars(description = "Baseline in points (default: 50)")]
    pub y: Option<f32>,
    #[schemars(description = "Font size (default: 12)")]
    pub size: Option<f32>,
    #[schemars(description = "Output file path (default: derived from the input)")]
    pub output: Option<String>,
    #[schemars(description = "Overwrite an existing output file (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSignRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Path to the signature image (png, jpg, gif, webp)")]
    pub signature: String,
    #[schemars(description = "'all' or comma-separated 1-based pages (default: last page)")]
    pub pages: Option<String>,
    #[schemars(description = "Left edge in points from the page's bottom-left (default: right-aligned, 50 from the edge)")]
    pub x: Option<f32>,
    #[schemars(description = "Bottom edge in points (default: 50)")]
    pub y: Option<f32>,
    #[schemars(description = "Width in points (default: up to 150, 30% of the page)")]
    pub width: Option<f32>,
    #[schemars(description = "Height in points (default: from the width and the image's aspect ratio)")]
    pub height: Option<f32>,
    #[schemars(description = "Opacity between 0 and 1 (default: 1)")]
    pub opacity: Option<f32>,
    #[schemars(description = "Make the image background transparent with ImageMagick first (default: false)")]
    #[serde(default)]
    pub remove_background: bool,
    #[schemars(description = "Background color tolerance in percent, with remove_background (default: 10)")]
    pub fuzz: Option<f32>,
    #[schemars(description = "Edge softening 0-100, with remove_background (default: 20)")]
    pub feather: Option<f32>,
    #[schemars(description = "Output file path (default: derived from the input)")]
    pub output: Option<String>,
    #[schemars(description = "Overwrite an existing output file (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfToWordRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Output .docx path (default: derived from the input)")]
    pub output: Option<String>,
    #[schemars(description = "Overwrite an existing output file (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    config: Config,
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json(result: Result<Report>) -> String {
    match result {
        Ok(report) => {
            serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {:#}", e),
    }
}

fn output_path(output: Option<&str>) -> Option<PathBuf> {
    output.map(normalize_path)
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Count the pages of a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(normalize_path(&path)) {
            Ok(doc) => {
                let result = PageCountResult {
                    path,
                    page_count: doc.page_count(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Merge two or more PDFs into one, pages appended in input order")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        let output = output_path(req.output.as_deref());
        to_json(commands::merge::run(
            &req.inputs,
            output.as_deref(),
            req.overwrite,
            &self.config,
        ))
    }

    #[tool(description = "Remove pages from a PDF. Removing every page is refused.")]
    fn pdf_remove_pages(&self, Parameters(req): Parameters<PdfPagesRequest>) -> String {
        let output = output_path(req.output.as_deref());
        to_json(commands::pages::remove(
            Path::new(&req.path),
            Some(req.pages.as_str()),
            output.as_deref(),
            req.overwrite,
            &self.config,
        ))
    }

    #[tool(description = "Reorder the pages of a PDF. The order must name every page exactly once.")]
    fn pdf_reorder_pages(&self, Parameters(req): Parameters<PdfPagesRequest>) -> String {
        let output = output_path(req.output.as_deref());
        to_json(commands::pages::reorder(
            Path::new(&req.path),
            Some(req.pages.as_str()),
            output.as_deref(),
            req.overwrite,
            &self.config,
        ))
    }

    #[tool(description = "Write today's date onto PDF pages")]
    fn pdf_insert_date(&self, Parameters(req): Parameters<PdfInsertDateRequest>) -> String {
        let options = commands::insert_date::DateOptions {
            x: req.x,
            y: req.y,
            size: req.size,
            format: req.format,
            pages: req.pages,
        };
        let output = output_path(req.output.as_deref());
        to_json(commands::insert_date::run(
            Path::new(&req.path),
            &options,
            output.as_deref(),
            req.overwrite,
            &self.config,
        ))
    }

    #[tool(description = "Stamp a signature image onto PDF pages, bottom-right by default")]
    async fn pdf_sign(&self, Parameters(req): Parameters<PdfSignRequest>) -> String {
        let background = req.remove_background.then(|| {
            let defaults = BackgroundOptions::default();
            BackgroundOptions {
                fuzz: req.fuzz.unwrap_or(defaults.fuzz),
                feather: req.feather.unwrap_or(defaults.feather),
                ..defaults
            }
        });
        let options = commands::sign::SignOptions {
            placement: ImagePlacement {
                x: req.x,
                y: req.y,
                width: req.width,
                height: req.height,
                opacity: req.opacity,
            },
            pages: req.pages,
            background,
        };
        let output = output_path(req.output.as_deref());
        to_json(
            commands::sign::run(
                Path::new(&req.path),
                Path::new(&req.signature),
                &options,
                output.as_deref(),
                req.overwrite,
                &self.config,
            )
            .await,
        )
    }

    #[tool(description = "Convert a PDF's text to a Word document. Layout, images and tables are not kept.")]
    fn pdf_to_word(&self, Parameters(req): Parameters<PdfToWordRequest>) -> String {
        let output = output_path(req.output.as_deref());
        to_json(commands::to_word::run(
            Path::new(&req.path),
            output.as_deref(),
            req.overwrite,
            &self.config,
        ))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF editing tools. Use pdf_page_count before choosing pages, pdf_merge to combine \
                 files, pdf_remove_pages and pdf_reorder_pages to edit page order, pdf_insert_date \
                 and pdf_sign to stamp pages, and pdf_to_word to export text. Page numbers are \
                 1-based; results go to a PDFile subdirectory next to the input unless an output \
                 path is given, and existing files are only replaced with overwrite set."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let server = PdfServer::new(config);
    tracing::info!("serving MCP over stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
