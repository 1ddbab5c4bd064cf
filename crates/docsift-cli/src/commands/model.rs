use std::io::Write;
use std::path::Path;

use anyhow::Context;
use docsift_lib::config::LOCAL_MODEL_SUBDIR;
use docsift_lib::output::ConsoleIO;
use tracing::debug;

/// Hugging Face repository for the GTE multilingual base model.
const HF_REPO: &str = "onnx-community/gte-multilingual-base";

/// `(remote path, local file name)` pairs fetched from [`HF_REPO`].
const MODEL_FILES: &[(&str, &str)] = &[
    ("onnx/model_int8.onnx", "model_int8.onnx"),
    ("tokenizer.json", "tokenizer.json"),
    ("config.json", "config.json"),
    ("special_tokens_map.json", "special_tokens_map.json"),
    ("tokenizer_config.json", "tokenizer_config.json"),
];

/// Run the `docsift model download` command, placing the files under
/// `model_root/gte-multilingual-base`.
pub fn run_model_download<OUT, ERR>(
    force: bool,
    model_root: &Path,
    io: &mut dyn ConsoleIO<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let model_dir = model_root.join(LOCAL_MODEL_SUBDIR);

    if force && model_dir.exists() {
        writeln!(io.stderr(), "Removing existing model files...")?;
        std::fs::remove_dir_all(&model_dir)
            .with_context(|| format!("failed to remove {}", model_dir.display()))?;
    }

    if !force
        && MODEL_FILES
            .iter()
            .all(|(_, local)| model_dir.join(local).exists())
    {
        writeln!(
            io.stdout(),
            "Model already downloaded at {}",
            model_dir.display()
        )?;
        return Ok(());
    }

    std::fs::create_dir_all(&model_dir)
        .with_context(|| format!("failed to create {}", model_dir.display()))?;

    writeln!(io.stderr(), "Downloading GTE multilingual base int8...")?;
    let api = hf_hub::api::sync::Api::new().context("failed to initialise Hugging Face client")?;
    let repo = api.model(HF_REPO.to_string());

    for (remote_path, local_name) in MODEL_FILES {
        let dest = model_dir.join(local_name);
        if dest.exists() {
            writeln!(io.stderr(), "  {local_name} (cached)")?;
            continue;
        }
        writeln!(io.stderr(), "  {local_name}...")?;
        let cached = repo
            .get(remote_path)
            .with_context(|| format!("failed to download {remote_path} from {HF_REPO}"))?;
        std::fs::copy(&cached, &dest)
            .with_context(|| format!("failed to copy {local_name} into place"))?;
        debug!(file = local_name, dest = %dest.display(), "Fetched model file");
    }

    writeln!(io.stdout(), "Model downloaded to {}", model_dir.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use docsift_lib::output::BufferedIO;
    use docsift_lib::runtime::Runtime;

    use super::*;

    #[tokio::test]
    async fn try_run_model_download_skips_complete_model() {
        let tmp = tempfile::tempdir().unwrap();
        let model_dir = tmp.path().join(LOCAL_MODEL_SUBDIR);
        std::fs::create_dir_all(&model_dir).unwrap();
        for (_, local) in MODEL_FILES {
            std::fs::write(model_dir.join(local), b"stub").unwrap();
        }
        let root = tmp.path().to_str().unwrap();

        let mut io = BufferedIO::new();
        crate::try_run(
            &["docsift", "--model-dir", root, "model", "download"],
            |_| -> anyhow::Result<Runtime> { anyhow::bail!("no backends needed") },
            &mut io,
        )
        .await
        .unwrap();

        assert_eq!(
            io.stdout_to_string(),
            format!("Model already downloaded at {}\n", model_dir.display())
        );
        assert_eq!(io.stderr_to_string(), "");
    }
}
