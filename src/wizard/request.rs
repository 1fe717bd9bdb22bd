use super::error::WizardError;
use super::labels::LabelSet;
use clap::{Args, ValueEnum};

/// How the cluster is actually created once parameters are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Provisioner {
    /// Generate a Terraform workspace and run init/plan/apply
    #[default]
    Terraform,
    /// Call `gcloud container clusters create` directly
    Gcloud,
}

/// Flags of `kubewiz gke`; every one of them can be answered interactively instead
#[derive(Debug, Clone, Default, Args)]
pub struct ClusterFlags {
    /// The name of this cluster, default is a random generated name
    #[arg(short = 'n', long = "cluster-name")]
    pub cluster_name: Option<String>,

    /// The IP address range for the pods in this cluster in CIDR notation (e.g. 10.0.0.0/14)
    #[arg(long = "cluster-ipv4-cidr")]
    pub cluster_ipv4_cidr: Option<String>,

    /// The Kubernetes version to use for the master and nodes. Defaults to server-specified
    #[arg(short = 'v', long = "kubernetes-version")]
    pub kubernetes_version: Option<String>,

    /// Size in GB for node VM boot disks. Defaults to 100GB
    #[arg(short = 'd', long = "disk-size")]
    pub disk_size: Option<String>,

    /// The image type for the nodes (e.g. COS_CONTAINERD)
    #[arg(long = "image-type")]
    pub image_type: Option<String>,

    /// Sets autoupgrade feature for the cluster's default node pool
    #[arg(long = "enable-autoupgrade")]
    pub auto_upgrade: bool,

    /// The type of machine to use for nodes
    #[arg(short = 'm', long = "machine-type")]
    pub machine_type: Option<String>,

    /// The minimum number of nodes to be created in each of the cluster's zones
    #[arg(long = "min-num-nodes")]
    pub min_num_nodes: Option<String>,

    /// The maximum number of nodes to be created in each of the cluster's zones
    #[arg(long = "max-num-nodes")]
    pub max_num_nodes: Option<String>,

    /// Google Project ID to create cluster in
    #[arg(short = 'p', long = "project-id", env = "CLOUDSDK_CORE_PROJECT")]
    pub project_id: Option<String>,

    /// The compute zone (e.g. us-central1-a) for the cluster
    #[arg(short = 'z', long = "zone", env = "CLOUDSDK_COMPUTE_ZONE")]
    pub zone: Option<String>,

    /// Skip Google auth if already logged in via gcloud auth
    #[arg(long = "skip-login")]
    pub skip_login: bool,

    /// The namespace the kubectl context is switched to once the cluster is up
    #[arg(long = "namespace")]
    pub namespace: Option<String>,

    /// The labels to add to the cluster being created such as 'foo=bar,whatnot=123'. Label names must begin with a lowercase character ([a-z]), end with a lowercase alphanumeric ([a-z0-9]) with dashes (-), and lowercase alphanumeric ([a-z0-9]) between.
    #[arg(long = "labels")]
    pub labels: Option<String>,

    /// How to create the cluster
    #[arg(long = "provisioner", value_enum, default_value_t = Provisioner::Terraform)]
    pub provisioner: Provisioner,

    /// Terraform compatible binary to run (e.g. terraform or tofu)
    #[arg(long = "iac-binary")]
    pub iac_binary: Option<String>,
}

/// A flag counts as given only when it is non-empty
pub fn flag_value(flag: &Option<String>) -> Option<&str> {
    flag.as_deref().filter(|v| !v.is_empty())
}

/// Validated node pool bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBounds {
    pub min: u32,
    pub max: u32,
}

impl NodeBounds {
    /// Parse raw min/max answers as positive integers with min <= max
    pub fn parse(min: &str, max: &str) -> Result<Self, WizardError> {
        let min = parse_node_count("minimum", min)?;
        let max = parse_node_count("maximum", max)?;

        if min > max {
            return Err(WizardError::InvalidInput(format!(
                "minimum number of nodes ({}) is greater than the maximum ({})",
                min, max
            )));
        }

        Ok(Self { min, max })
    }
}

fn parse_node_count(which: &str, raw: &str) -> Result<u32, WizardError> {
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(WizardError::InvalidInput(format!(
            "{} number of nodes must be a positive integer, got '{}'",
            which, raw
        ))),
    }
}

/// The fully resolved parameter set for one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRequest {
    pub name: String,
    pub project_id: String,
    pub zone: String,
    pub machine_type: String,
    pub nodes: NodeBounds,
    pub disk_size: Option<String>,
    pub image_type: Option<String>,
    pub kubernetes_version: Option<String>,
    pub cluster_ipv4_cidr: Option<String>,
    pub auto_upgrade: bool,
    pub namespace: String,
    pub labels: LabelSet,
}

impl ClusterRequest {
    /// Summary rows shown before anything is created
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Cluster name", self.name.clone()),
            ("Project", self.project_id.clone()),
            ("Zone", self.zone.clone()),
            ("Machine type", self.machine_type.clone()),
            ("Nodes", format!("{} - {}", self.nodes.min, self.nodes.max)),
            ("Namespace", self.namespace.clone()),
        ];

        if let Some(disk_size) = &self.disk_size {
            rows.push(("Disk size (GB)", disk_size.clone()));
        }
        if let Some(image_type) = &self.image_type {
            rows.push(("Image type", image_type.clone()));
        }
        if let Some(version) = &self.kubernetes_version {
            rows.push(("Kubernetes version", version.clone()));
        }
        if let Some(cidr) = &self.cluster_ipv4_cidr {
            rows.push(("Cluster IPv4 CIDR", cidr.clone()));
        }
        if self.auto_upgrade {
            rows.push(("Auto upgrade", "enabled".to_string()));
        }
        if !self.labels.is_empty() {
            rows.push(("Labels", self.labels.joined()));
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_value_ignores_empty() {
        assert_eq!(flag_value(&None), None);
        assert_eq!(flag_value(&Some(String::new())), None);
        assert_eq!(flag_value(&Some("us-east1-b".to_string())), Some("us-east1-b"));
    }

    #[test]
    fn test_node_bounds_parse() {
        assert_eq!(NodeBounds::parse("3", " 5 ").unwrap(), NodeBounds { min: 3, max: 5 });
        assert_eq!(NodeBounds::parse("4", "4").unwrap(), NodeBounds { min: 4, max: 4 });
    }

    #[test]
    fn test_node_bounds_rejects_bad_values() {
        for (min, max) in [("0", "3"), ("three", "5"), ("-1", "5"), ("3", ""), ("6", "5")] {
            assert!(
                matches!(NodeBounds::parse(min, max), Err(WizardError::InvalidInput(_))),
                "expected ({}, {}) to be rejected",
                min,
                max
            );
        }
    }

    #[test]
    fn test_summary_skips_unset_optionals() {
        let request = ClusterRequest {
            name: "fuzzyotter".to_string(),
            project_id: "demo".to_string(),
            zone: "europe-west1-b".to_string(),
            machine_type: "n1-standard-2".to_string(),
            nodes: NodeBounds { min: 3, max: 5 },
            disk_size: None,
            image_type: None,
            kubernetes_version: Some("1.29".to_string()),
            cluster_ipv4_cidr: None,
            auto_upgrade: false,
            namespace: "jx".to_string(),
            labels: LabelSet::default(),
        };

        let keys: Vec<&str> = request.summary().iter().map(|(k, _)| *k).collect();
        assert!(keys.contains(&"Kubernetes version"));
        assert!(!keys.contains(&"Disk size (GB)"));
        assert!(!keys.contains(&"Labels"));
    }
}
