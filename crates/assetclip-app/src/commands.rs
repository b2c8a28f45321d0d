//! Subcommand implementations.
//!
//! Documents on disk are JSON in the clipboard wire form, so binary leaves
//! written by one command are read back as binaries by the next.

use anyhow::{Context, bail};
use assetclip_core::codec;
use assetclip_core::{
    Clipboard, ClipboardConfig, FileStorage, Notice, Notifier, PasteOptions, Value,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type AppClipboard = Clipboard<FileStorage>;

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Clipboard type tag
    #[arg(short = 't', long = "type")]
    pub type_tag: String,

    /// JSON file with the data to copy
    pub data: PathBuf,

    /// JSON document whose registry the data references
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PasteArgs {
    /// Clipboard type tag
    #[arg(short = 't', long = "type")]
    pub type_tag: String,

    /// JSON object file receiving the pasted fields
    pub target: PathBuf,

    /// JSON document whose registry receives pasted dependencies
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Top-level fields to leave out
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Clipboard type tag
    #[arg(short = 't', long = "type")]
    pub type_tag: String,

    /// JSON document whose registry receives pasted dependencies
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Prints notices to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice);
    }
}

pub fn open(storage: Arc<FileStorage>, config: ClipboardConfig) -> AppClipboard {
    Clipboard::new(storage, config).with_notifier(Arc::new(ConsoleNotifier))
}

fn load_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(codec::decode(json)?)
}

async fn to_json(value: &Value) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&codec::encode(value).await?)?)
}

async fn save_document(path: &Path, value: &Value) -> anyhow::Result<()> {
    let text = to_json(value).await?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

pub async fn copy(clipboard: &AppClipboard, args: CopyArgs) -> anyhow::Result<()> {
    let data = load_document(&args.data)?;
    let root = args.root.as_deref().map(load_document).transpose()?;
    clipboard.copy(&args.type_tag, &data, root.as_ref()).await?;
    Ok(())
}

pub async fn paste(clipboard: &AppClipboard, args: PasteArgs) -> anyhow::Result<()> {
    if args.root.as_ref() == Some(&args.target) {
        bail!("Target and root must be different files");
    }

    let Value::Record(mut target) = load_document(&args.target)? else {
        bail!("{} does not hold a JSON object", args.target.display());
    };
    let mut root = args.root.as_deref().map(load_document).transpose()?;

    let options = PasteOptions {
        exclude: args.exclude,
    };
    let report = clipboard
        .paste(&args.type_tag, &mut target, root.as_mut(), &options)
        .await?;

    save_document(&args.target, &Value::Record(target)).await?;
    if let (Some(path), Some(root)) = (&args.root, &root) {
        if report.added > 0 {
            save_document(path, root).await?;
        }
    }
    Ok(())
}

pub async fn read(clipboard: &AppClipboard, args: ReadArgs) -> anyhow::Result<()> {
    let mut root = args.root.as_deref().map(load_document).transpose()?;
    let before = root.clone();

    let Some(value) = clipboard.read(&args.type_tag, root.as_mut()).await? else {
        bail!("Clipboard does not contain '{}'", args.type_tag);
    };
    println!("{}", to_json(&value).await?);

    if let (Some(path), Some(root)) = (&args.root, &root) {
        if before.as_ref() != Some(root) {
            save_document(path, root).await?;
        }
    }
    Ok(())
}

pub async fn status(clipboard: &AppClipboard) -> anyhow::Result<()> {
    match clipboard.current_type().await? {
        Some(type_tag) => println!("{}", type_tag),
        None => println!("(empty)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_copy_paste_between_documents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("store")).unwrap());
        let clipboard = open(storage, ClipboardConfig::default());

        let source = write_json(dir.path(), "source.json", json!({
            "data": { "sprites": [ { "id": "s1", "texture": "" } ] }
        }));
        let data = write_json(dir.path(), "data.json", json!({ "spriteId": "s1", "size": 2, "seed": 9007199254740993u64 }));
        pollster::block_on(copy(&clipboard, CopyArgs {
            type_tag: "effect".into(),
            data,
            root: Some(source),
        }))
        .unwrap();

        let dest = write_json(dir.path(), "dest.json", json!({ "data": { "sprites": [] } }));
        let target = write_json(dir.path(), "target.json", json!({ "size": 1, "name": "keep" }));
        pollster::block_on(paste(&clipboard, PasteArgs {
            type_tag: "effect".into(),
            target: target.clone(),
            root: Some(dest.clone()),
            exclude: vec![],
        }))
        .unwrap();

        assert_eq!(
            read_json(&target),
            json!({ "size": 2, "name": "keep", "spriteId": "s1", "seed": 9007199254740993u64 })
        );
        assert!(std::fs::read_to_string(&target).unwrap().contains("9007199254740993"));
        assert_eq!(
            read_json(&dest),
            json!({ "data": { "sprites": [ { "id": "s1", "texture": "" } ] } })
        );
    }

    #[test]
    fn test_paste_rejects_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
        let clipboard = open(storage, ClipboardConfig::default());
        let doc = write_json(dir.path(), "doc.json", json!({}));

        let result = pollster::block_on(paste(&clipboard, PasteArgs {
            type_tag: "x".into(),
            target: doc.clone(),
            root: Some(doc),
            exclude: vec![],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_mismatch_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
        let clipboard = open(storage, ClipboardConfig::default());

        let result = pollster::block_on(read(&clipboard, ReadArgs {
            type_tag: "x".into(),
            root: None,
        }));
        assert!(result.is_err());
    }
}
