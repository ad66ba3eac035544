use crate::domain::TenantScope;
use crate::format::load_file;
use crate::graph::{DEFAULT_LABEL_KEY, PropertyKeyMapper};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CATALOG_CAPACITY: usize = 16;
const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;

/// Resolved runtime configuration.
///
/// The scope, when configured, is passed explicitly into every core call;
/// there is no process-wide tenant.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub scope: Option<TenantScope>,
    pub property_keys: HashMap<String, String>,
    pub edge_labels: HashMap<String, String>,
    pub label_key: String,
    /// `None` disables the per-read deadline
    pub read_timeout: Option<Duration>,
    pub catalog_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            scope: None,
            property_keys: HashMap::new(),
            edge_labels: HashMap::new(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
            read_timeout: Some(Duration::from_millis(DEFAULT_READ_TIMEOUT_MS)),
            catalog_capacity: DEFAULT_CATALOG_CAPACITY,
        }
    }
}

impl GateConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let file_config = if let Some(path) = args.config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            tenant: file_tenant,
            package: file_package,
            channel: file_channel,
            property_keys,
            edge_labels,
            label_key: file_label_key,
            read_timeout_ms: file_read_timeout_ms,
            catalog_capacity: file_catalog_capacity,
        } = file_config;

        let tenant = args.tenant.clone().or(file_tenant);
        let package = args.package.clone().or(file_package);
        let channel = args.channel.clone().or(file_channel);
        let scope = match (tenant, package, channel) {
            (None, None, None) => None,
            (Some(tenant), Some(package), Some(channel)) => Some(
                TenantScope::parse(tenant, package, channel)
                    .context("invalid configured scope")?,
            ),
            _ => anyhow::bail!("tenant, package and channel must be configured together"),
        };

        let label_key = args
            .label_key
            .clone()
            .or(file_label_key)
            .map(|key| key.trim().to_string())
            .unwrap_or_else(|| DEFAULT_LABEL_KEY.to_string());
        anyhow::ensure!(!label_key.is_empty(), "label key cannot be empty");

        let read_timeout = match args
            .read_timeout_ms
            .or(file_read_timeout_ms)
            .unwrap_or(DEFAULT_READ_TIMEOUT_MS)
        {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let catalog_capacity = args
            .catalog_capacity
            .or(file_catalog_capacity)
            .unwrap_or(DEFAULT_CATALOG_CAPACITY)
            .max(1);

        Ok(Self {
            scope,
            property_keys: property_keys.unwrap_or_default(),
            edge_labels: edge_labels.unwrap_or_default(),
            label_key,
            read_timeout,
            catalog_capacity,
        })
    }

    /// Builds the predicate mapper described by this configuration.
    pub fn mapper(&self) -> PropertyKeyMapper {
        PropertyKeyMapper::new(self.property_keys.clone(), self.edge_labels.clone())
            .with_label_key(self.label_key.clone())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ontology-gate",
    about = "Validate tenant ontologies and evaluate graph preconditions",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(long, env = "ONTOLOGY_GATE_TENANT", value_name = "ID", global = true)]
    pub tenant: Option<String>,

    #[arg(long, env = "ONTOLOGY_GATE_PACKAGE", value_name = "NAME", global = true)]
    pub package: Option<String>,

    #[arg(long, env = "ONTOLOGY_GATE_CHANNEL", value_name = "NAME", global = true)]
    pub channel: Option<String>,

    #[arg(
        long,
        env = "ONTOLOGY_GATE_LABEL_KEY",
        value_name = "KEY",
        help = "Vertex property used for existence checks",
        global = true
    )]
    pub label_key: Option<String>,

    #[arg(
        long,
        env = "ONTOLOGY_GATE_READ_TIMEOUT_MS",
        value_name = "MS",
        help = "Deadline for a single graph read, 0 disables it",
        global = true
    )]
    pub read_timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "ONTOLOGY_GATE_CATALOG_CAPACITY",
        value_name = "N",
        help = "Maximum number of ontology snapshots kept in memory",
        value_parser = clap::value_parser!(usize),
        global = true
    )]
    pub catalog_capacity: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate an ontology document and print the report
    Validate {
        #[arg(long, value_name = "FILE")]
        ontology: PathBuf,
    },
    /// Evaluate preconditions for one subject against a graph fixture
    Check {
        #[arg(long, value_name = "FILE")]
        ontology: PathBuf,
        #[arg(long, value_name = "FILE", help = "Vertex id -> properties (YAML or JSON)")]
        graph: PathBuf,
        #[arg(long, value_name = "LABEL")]
        label: String,
        #[arg(long, value_name = "ID")]
        id: String,
        #[arg(long, value_name = "FILE", help = "List of preconditions (YAML or JSON)")]
        preconditions: PathBuf,
    },
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    tenant: Option<String>,
    package: Option<String>,
    channel: Option<String>,
    property_keys: Option<HashMap<String, String>>,
    edge_labels: Option<HashMap<String, String>>,
    label_key: Option<String>,
    read_timeout_ms: Option<u64>,
    catalog_capacity: Option<usize>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    load_file(path, "config")
}
