//! Config template materialization and port rewriting.
//!
//! A template resource is copied byte-for-byte into the scratch directory,
//! then every `*_port: 0` directive is rewritten in place to a freshly
//! allocated free port. All other content passes through byte-identical,
//! except that a leading byte-order mark is honored on read and dropped on
//! write-back.
//!
//! Directive grammar, anchored per physical line (nothing else in the
//! document is interpreted):
//!
//! ```text
//! ^([a-z_]+)_port:\s*([0-9]+)\s*$
//! ```
//!
//! A key not ending in `_port` is ignored by design; the scan is a targeted
//! line rewrite, not a document parse.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tracing::warn;

use crate::dirs;
use crate::find_unused_port;
use crate::Error;
use crate::Result;

/// Default bundled template; starts the engine on well-known fixed ports.
pub const DEFAULT_CONFIG_RESOURCE: &str = "store.yaml";
/// Bundled template whose port directives are all `0` (random free ports).
pub const RANDOM_PORT_CONFIG_RESOURCE: &str = "store-rndport.yaml";
/// Bundled fallback diagnostics configuration for the engine.
pub const DIAGNOSTICS_CONFIG_RESOURCE: &str = "store-diagnostics.toml";

/// Templates shipped inside the crate, resolved by base name.
const BUNDLED_RESOURCES: &[(&str, &[u8])] = &[
    (
        DEFAULT_CONFIG_RESOURCE,
        include_bytes!("../resources/store.yaml"),
    ),
    (
        RANDOM_PORT_CONFIG_RESOURCE,
        include_bytes!("../resources/store-rndport.yaml"),
    ),
    (
        DIAGNOSTICS_CONFIG_RESOURCE,
        include_bytes!("../resources/store-diagnostics.toml"),
    ),
];

static PORT_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z_]+)_port:\s*([0-9]+)\s*$").expect("port directive pattern"));

/// Ports resolved during preparation for the two directives the rest of
/// the harness cares about. `0` means the directive was not present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedPorts {
    pub native_transport: u16,
    pub rpc: u16,
}

/// A config document materialized into the scratch directory.
#[derive(Debug, Clone)]
pub struct PreparedConfig {
    /// Absolute path of the prepared file.
    pub path: PathBuf,
    pub ports: ResolvedPorts,
}

/// Materialize `resource` into `scratch_dir` and resolve its ports.
///
/// Recreates the scratch directory, copies the template byte-for-byte
/// under its base file name, rewrites every `*_port: 0` directive to a
/// free port and records the values of the `native_transport_port` and
/// `rpc_port` directives. A template with no zero-port directives is
/// copied unmodified and never written back.
pub fn prepare_config(resource: &str, scratch_dir: &Path) -> Result<PreparedConfig> {
    dirs::reset_directory(scratch_dir)?;
    let path = copy_resource(resource, scratch_dir)?;
    let ports = replace_port_zero_by_a_random_free_port(&path)?;
    debug!(path = %path.display(), ?ports, "prepared store config");
    Ok(PreparedConfig {
        path: absolute(&path)?,
        ports,
    })
}

/// Absolute path the prepared file will occupy, computed without touching
/// the filesystem. This is the config identity the lifecycle guard checks
/// before any directory is wiped.
pub fn prepared_config_path(resource: &str, scratch_dir: &Path) -> Result<PathBuf> {
    absolute(&scratch_dir.join(base_name(resource)))
}

/// Copy a named resource byte-for-byte into `directory` under its base
/// file name. Bundled resources are matched first; otherwise the id is
/// tried as a filesystem path.
pub(crate) fn copy_resource(resource: &str, directory: &Path) -> Result<PathBuf> {
    let bytes = resource_bytes(resource)?;
    fs::create_dir_all(directory)?;
    let target = directory.join(base_name(resource));
    fs::write(&target, bytes)?;
    Ok(target)
}

fn resource_bytes(resource: &str) -> Result<Vec<u8>> {
    let name = base_name(resource);
    if let Some((_, bytes)) = BUNDLED_RESOURCES.iter().find(|(n, _)| *n == name) {
        return Ok(bytes.to_vec());
    }
    let path = Path::new(resource);
    if path.is_file() {
        return Ok(fs::read(path)?);
    }
    Err(Error::UnknownResource(resource.to_string()))
}

fn base_name(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Rewrite `*_port: 0` directives to fresh free ports, tracking the two
/// directives named `native_transport` and `rpc` whether or not they were
/// rewritten. Writes the document back only if something changed.
fn replace_port_zero_by_a_random_free_port(config: &Path) -> Result<ResolvedPorts> {
    let text = read_config_text(config)?;

    let mut ports = ResolvedPorts::default();
    let mut dirty = false;
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches('\n').trim_end_matches('\r');
        let eol = &line[body.len()..];

        let Some(caps) = PORT_DIRECTIVE.captures(body) else {
            out.push_str(line);
            continue;
        };
        let name = &caps[1];
        let Ok(mut value) = caps[2].parse::<u16>() else {
            warn!(
                directive = name,
                value = &caps[2],
                "port directive value is not a valid port; leaving the line untouched"
            );
            out.push_str(line);
            continue;
        };

        if value == 0 {
            value = find_unused_port()?;
            out.push_str(&format!("{name}_port: {value}"));
            out.push_str(eol);
            dirty = true;
        } else {
            out.push_str(line);
        }

        match name {
            "native_transport" => ports.native_transport = value,
            "rpc" => ports.rpc = value,
            _ => {}
        }
    }

    if dirty {
        write_config_text(config, &out)?;
    }
    Ok(ports)
}

/// Read the document as text, honoring a leading byte-order mark.
fn read_config_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    decode_with_bom(&bytes).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{}: {e}", path.display()))
            .into()
    })
}

fn decode_with_bom(bytes: &[u8]) -> std::result::Result<String, String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec()).map_err(|e| e.to_string());
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("odd byte length in UTF-16 content".to_string());
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| read([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}

/// Write the document back as UTF-8 without a byte-order mark, replacing
/// the original atomically (write-then-rename, never in-place streaming).
fn write_config_text(path: &Path, text: &str) -> Result<()> {
    // Suffix, not extension swap: a template already named `*.tmp` must
    // not collide with its own temp file.
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}
