//! Test utilities: app construction and in-memory PDF fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};

use crate::{
    config::{Config, UploadConfig},
    extraction::PdfBackend,
};

/// Default config with uploads staged in `temp_dir`.
pub fn create_test_config(temp_dir: &Path) -> Config {
    Config {
        upload: UploadConfig {
            temp_dir: Some(temp_dir.to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub async fn create_test_app(config: Config, backend: Arc<dyn PdfBackend>) -> TestServer {
    crate::Application::new_with_backend(config, backend)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Everything currently in `dir`.
pub fn staged_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("readable temp dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect()
}

/// A PDF with one page per entry, each showing its text in Courier. Empty entries give pages with
/// no text operators at all.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encodable content")));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serializable PDF");
    bytes
}
