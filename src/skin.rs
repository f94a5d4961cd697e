use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{info, warn};

use crate::archive::SkinArchive;
use crate::canvas::{Canvas, RepresentationConfig};
use crate::catalog::Representation;
use crate::element::GameType;
use crate::foundation::error::{SkinError, SkinResult};

/// Project descriptor file name inside the project directory.
pub const PROJECT_FILE: &str = "skin.json";
/// Name of the aggregate configuration entry inside the archive.
pub const CONFIG_ENTRY: &str = "info.json";
/// Extension of the produced skin archive.
pub const SKIN_EXT: &str = "deltaskin";

/// The project descriptor, authored by the skin maker.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub author: String,
    pub version: String,
    pub skin_name: String,
    pub skin_id: String,
    /// Target system identifier, e.g. `com.rileytestut.delta.game.gba`.
    pub system: GameType,
}

/// The aggregate configuration document written as `info.json`.
///
/// Representation fragments are inserted by key path (family, subtype,
/// orientation); a later insertion at the same path overwrites.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinConfiguration {
    pub name: String,
    pub identifier: String,
    pub game_type_identifier: GameType,
    pub debug: bool,
    pub representations: serde_json::Map<String, serde_json::Value>,
    pub alt_representations: serde_json::Map<String, serde_json::Value>,
}

impl SkinConfiguration {
    fn new(config: &ProjectConfig) -> Self {
        Self {
            name: config.skin_name.clone(),
            identifier: config.skin_id.clone(),
            game_type_identifier: config.system,
            debug: false,
            representations: serde_json::Map::new(),
            alt_representations: serde_json::Map::new(),
        }
    }

    /// Insert one representation's fragment into its partition.
    pub fn insert_fragment(
        &mut self,
        representation: &Representation,
        fragment: RepresentationConfig,
    ) -> SkinResult<()> {
        let leaf = serde_json::to_value(fragment).context("serialize representation fragment")?;
        let partition = if representation.alt {
            &mut self.alt_representations
        } else {
            &mut self.representations
        };
        insert_at_path(partition, &representation.config_path(), leaf);
        Ok(())
    }
}

fn insert_at_path(
    partition: &mut serde_json::Map<String, serde_json::Value>,
    path: &[&'static str; 3],
    leaf: serde_json::Value,
) {
    let [family, subtype, orientation] = *path;
    let mut family_map = match partition.remove(family) {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    let mut subtype_map = match family_map.remove(subtype) {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    subtype_map.insert(orientation.to_string(), leaf);
    family_map.insert(subtype.to_string(), serde_json::Value::Object(subtype_map));
    partition.insert(family.to_string(), serde_json::Value::Object(family_map));
}

/// The whole project: descriptor plus the directory the canvases live in.
pub struct Skin {
    pub config: ProjectConfig,
    project_dir: PathBuf,
}

impl Skin {
    /// Read and parse the project descriptor.
    pub fn load(project_dir: &Path) -> SkinResult<Self> {
        let path = project_dir.join(PROJECT_FILE);
        info!(path = %path.display(), "loading skin configuration");
        let bytes =
            std::fs::read(&path).with_context(|| format!("read '{}'", path.display()))?;
        let config: ProjectConfig = serde_json::from_slice(&bytes)
            .map_err(|err| SkinError::parse(format!("malformed {PROJECT_FILE}: {err}")))?;
        Ok(Self {
            config,
            project_dir: project_dir.to_path_buf(),
        })
    }

    /// Output archive name, `<skinName>-<version>.deltaskin`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{SKIN_EXT}",
            self.config.skin_name, self.config.version
        )
    }

    /// Render every requested representation and finalize the skin archive.
    ///
    /// A broken representation is skipped with a warning; the run fails only
    /// when zero representations succeed or the archive cannot be written.
    pub fn assemble(
        &self,
        representations: &[Representation],
        output_dir: &Path,
    ) -> SkinResult<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("create output dir '{}'", output_dir.display()))?;
        let out_path = output_dir.join(self.file_name());
        info!(
            skin = %self.config.skin_name,
            author = %self.config.author,
            path = %out_path.display(),
            "creating skin"
        );

        let file = std::fs::File::create(&out_path)
            .map_err(|err| SkinError::archive(format!("create '{}': {err}", out_path.display())))?;
        let mut archive = SkinArchive::new(BufWriter::new(file));
        let mut aggregate = SkinConfiguration::new(&self.config);

        let mut rendered = 0usize;
        for representation in representations {
            match self.compose(representation, &mut aggregate, &mut archive) {
                Ok(()) => {
                    rendered += 1;
                    info!(%representation, "rendered representation");
                }
                Err(err) => {
                    warn!(%representation, %err, "unable to render representation, skipping");
                }
            }
        }
        if rendered == 0 {
            drop(archive);
            let _ = std::fs::remove_file(&out_path);
            return Err(SkinError::validation(
                "no representation could be rendered",
            ));
        }

        archive.add_file(
            CONFIG_ENTRY,
            &serde_json::to_vec(&aggregate).context("serialize skin configuration")?,
        )?;
        let mut inner = archive.finish()?;
        inner
            .flush()
            .map_err(|err| SkinError::archive(format!("flush archive: {err}")))?;
        Ok(out_path)
    }

    fn compose<W: Write + Seek>(
        &self,
        representation: &Representation,
        aggregate: &mut SkinConfiguration,
        archive: &mut SkinArchive<W>,
    ) -> SkinResult<()> {
        let canvas = Canvas::create(&self.project_dir, *representation, self.config.system)?;
        let png = canvas.render()?;
        archive.add_file(&representation.output_file_name(), &png)?;
        aggregate.insert_fragment(representation, canvas.config_fragment())
    }
}
