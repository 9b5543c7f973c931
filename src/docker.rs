//! Docker SDK wrapper used by the terminal dashboard.

use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    RestartContainerOptions, StopContainerOptions,
};
use bollard::models::{ContainerInspectResponse, ContainerSummary, PortMap, Service};
use bollard::service::ListServicesOptions;
use bollard::Docker;
use futures_util::StreamExt;

/// Number of log lines fetched per dashboard refresh.
pub const LOG_TAIL: usize = 200;

/// One row of the dashboard's container table.
#[derive(Clone, Debug, Default)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    pub uptime: String,
    pub ports: String,
}

/// One row of the swarm services table.
#[derive(Clone, Debug, Default)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub mode: String,
    pub replicas: String,
}

/// Inspection data for the details screen: configuration, mounts, and
/// networks of a single container.
#[derive(Clone, Debug, Default)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    pub image: String,
    pub created: String,
    pub status: String,
    pub ports: String,
    pub env: Vec<String>,
    /// (source, destination, mode) per mount.
    pub mounts: Vec<(String, String, String)>,
    /// (network, ip address, gateway) per attached network.
    pub networks: Vec<(String, String, String)>,
    pub restart_count: i64,
    pub uptime: String,
}

/// Wrapper around bollard's Docker client. Constructed once at dashboard
/// startup and passed explicitly; there is no global client.
pub struct DockerClient {
    client: Docker,
}

impl DockerClient {
    /// Try to connect to the Docker daemon. Returns None if Docker is not
    /// available.
    pub fn try_new() -> Option<Self> {
        let client = Docker::connect_with_local_defaults().ok()?;
        Some(Self { client })
    }

    /// Ping the daemon to verify it is reachable.
    pub async fn is_available(&self) -> bool {
        self.client.ping().await.is_ok()
    }

    /// List all containers (running and stopped) for the dashboard table.
    pub async fn list_containers(&self) -> Result<Vec<ContainerInfo>, String> {
        let options: ListContainersOptions<String> = ListContainersOptions {
            all: true,
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| e.to_string())?;

        Ok(summaries.iter().map(summary_to_info).collect())
    }

    /// Fetch the last `LOG_TAIL` log lines of a container, timestamps on.
    /// One-shot: the dashboard's follow toggle re-issues this same call on a
    /// timer rather than holding a streaming connection open.
    pub async fn fetch_logs(&self, container_id: &str) -> Result<Vec<String>, String> {
        let options: LogsOptions<String> = LogsOptions {
            stdout: true,
            stderr: true,
            follow: false,
            tail: LOG_TAIL.to_string(),
            timestamps: true,
            ..Default::default()
        };

        let mut stream = self.client.logs(container_id, Some(options));
        let mut lines = Vec::new();
        while let Some(result) = stream.next().await {
            match result {
                Ok(LogOutput::StdOut { message })
                | Ok(LogOutput::StdErr { message })
                | Ok(LogOutput::Console { message }) => {
                    lines.push(String::from_utf8_lossy(&message).trim_end().to_string());
                }
                Ok(LogOutput::StdIn { .. }) => continue,
                Err(e) => return Err(e.to_string()),
            }
        }
        Ok(lines)
    }

    /// List swarm services for the services screen. Fails when the daemon is
    /// not part of a swarm; the caller surfaces the message.
    pub async fn list_services(&self) -> Result<Vec<ServiceInfo>, String> {
        let options: ListServicesOptions<String> = ListServicesOptions {
            status: true,
            ..Default::default()
        };
        let services = self
            .client
            .list_services(Some(options))
            .await
            .map_err(|e| e.to_string())?;
        Ok(services.iter().map(service_to_info).collect())
    }

    /// Inspect one container for the details screen.
    pub async fn inspect_container(&self, container_id: &str) -> Result<ContainerDetails, String> {
        let response = self
            .client
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| e.to_string())?;
        Ok(inspect_to_details(&response))
    }

    pub async fn start_container(&self, container_id: &str) -> Result<(), String> {
        self.client
            .start_container::<String>(container_id, None)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn stop_container(&self, container_id: &str) -> Result<(), String> {
        let options = StopContainerOptions { t: 10 };
        self.client
            .stop_container(container_id, Some(options))
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn restart_container(&self, container_id: &str) -> Result<(), String> {
        let options = RestartContainerOptions { t: 10 };
        self.client
            .restart_container(container_id, Some(options))
            .await
            .map_err(|e| e.to_string())
    }
}

fn summary_to_info(s: &ContainerSummary) -> ContainerInfo {
    let id_full = s.id.clone().unwrap_or_default();
    let id_short: String = id_full.chars().take(12).collect();

    let name = s
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id_short.clone());

    ContainerInfo {
        id: id_short,
        name,
        image: s.image.clone().unwrap_or_default(),
        state: s.state.clone().unwrap_or_default(),
        status: s.status.clone().unwrap_or_default(),
        uptime: format_uptime(s.created.unwrap_or(0)),
        ports: format_ports(s),
    }
}

fn service_to_info(s: &Service) -> ServiceInfo {
    let id_full = s.id.clone().unwrap_or_default();
    let id_short: String = id_full.chars().take(12).collect();

    let spec = s.spec.as_ref();
    let name = spec
        .and_then(|sp| sp.name.clone())
        .unwrap_or_else(|| id_short.clone());
    let image = spec
        .and_then(|sp| sp.task_template.as_ref())
        .and_then(|t| t.container_spec.as_ref())
        .and_then(|c| c.image.as_deref())
        .map(strip_image_digest)
        .unwrap_or_default();

    let (mode, spec_replicas) = match spec.and_then(|sp| sp.mode.as_ref()) {
        Some(m) if m.global.is_some() => ("global".to_string(), None),
        Some(m) => (
            "replicated".to_string(),
            m.replicated.as_ref().and_then(|r| r.replicas),
        ),
        None => (String::new(), None),
    };

    // `docker service ls` style running/desired counts when the daemon
    // reports them, otherwise the declared replica count.
    let replicas = match s.service_status.as_ref() {
        Some(st) => format!(
            "{}/{}",
            st.running_tasks.unwrap_or(0),
            st.desired_tasks.unwrap_or(0)
        ),
        None => spec_replicas.map(|r| r.to_string()).unwrap_or_default(),
    };

    ServiceInfo {
        id: id_short,
        name,
        image,
        mode,
        replicas,
    }
}

/// Drop the `@sha256:...` pin that swarm appends to resolved images.
fn strip_image_digest(image: &str) -> String {
    image.split('@').next().unwrap_or(image).to_string()
}

fn inspect_to_details(r: &ContainerInspectResponse) -> ContainerDetails {
    let id_full = r.id.clone().unwrap_or_default();
    let id_short: String = id_full.chars().take(12).collect();
    let name = r
        .name
        .as_deref()
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id_short.clone());

    let config = r.config.as_ref();
    let image = config.and_then(|c| c.image.clone()).unwrap_or_default();
    let env = config.and_then(|c| c.env.clone()).unwrap_or_default();

    let created = r
        .created
        .as_deref()
        .map(format_inspect_time)
        .unwrap_or_default();

    let state = r.state.as_ref();
    let status = state
        .and_then(|st| st.status.as_ref())
        .map(|s| s.to_string())
        .unwrap_or_default();
    let running = state.and_then(|st| st.running).unwrap_or(false);
    let uptime = if running {
        state
            .and_then(|st| st.started_at.as_deref())
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| format_uptime(dt.timestamp()))
            .unwrap_or_else(|| "-".to_string())
    } else {
        "-".to_string()
    };

    let ports = r
        .network_settings
        .as_ref()
        .and_then(|ns| ns.ports.as_ref())
        .map(format_port_map)
        .unwrap_or_default();

    let mounts = r
        .mounts
        .as_ref()
        .map(|mounts| {
            mounts
                .iter()
                .map(|m| {
                    (
                        m.source.clone().unwrap_or_default(),
                        m.destination.clone().unwrap_or_default(),
                        m.mode.clone().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let mut networks: Vec<(String, String, String)> = r
        .network_settings
        .as_ref()
        .and_then(|ns| ns.networks.as_ref())
        .map(|nets| {
            nets.iter()
                .map(|(net, ep)| {
                    (
                        net.clone(),
                        ep.ip_address.clone().unwrap_or_default(),
                        ep.gateway.clone().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    networks.sort();

    ContainerDetails {
        id: id_short,
        name,
        image,
        created,
        status,
        ports,
        env,
        mounts,
        networks,
        restart_count: r.restart_count.unwrap_or(0),
        uptime,
    }
}

/// `2024-05-01T12:00:00.123456789Z` → `2024-05-01 12:00:00`; unparseable
/// timestamps pass through untouched.
fn format_inspect_time(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

/// Format an inspect-style port map as `host->container` pairs, sorted.
fn format_port_map(ports: &PortMap) -> String {
    let mut parts = Vec::new();
    for (key, bindings) in ports {
        let container_port = key.split('/').next().unwrap_or(key);
        if let Some(bindings) = bindings {
            for b in bindings {
                if let Some(host_port) = &b.host_port {
                    parts.push(format!("{}->{}", host_port, container_port));
                }
            }
        }
    }
    parts.sort();
    parts.join(", ")
}

fn format_uptime(created_ts: i64) -> String {
    if created_ts == 0 {
        return "unknown".to_string();
    }
    let now = chrono::Utc::now().timestamp();
    let secs = (now - created_ts).max(0) as u64;

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

fn format_ports(s: &ContainerSummary) -> String {
    let Some(ports) = &s.ports else {
        return String::new();
    };
    let mut parts = Vec::new();
    for p in ports {
        let proto = p
            .typ
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "tcp".to_string());
        if let (Some(ip), Some(pub_port)) = (&p.ip, p.public_port) {
            parts.push(format!("{}:{}->{}/{}", ip, pub_port, p.private_port, proto));
        } else {
            parts.push(format!("{}/{}", p.private_port, proto));
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uptime_buckets() {
        assert_eq!(format_uptime(0), "unknown");
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_uptime(now - 30), "30s");
        assert_eq!(format_uptime(now - 120), "2m");
        assert_eq!(format_uptime(now - 3700), "1h 1m");
        assert_eq!(format_uptime(now - 90000), "1d 1h");
    }

    #[test]
    fn service_to_info_reads_spec_and_status() {
        use bollard::models::{
            ServiceServiceStatus, ServiceSpec, ServiceSpecMode, ServiceSpecModeReplicated,
            TaskSpec, TaskSpecContainerSpec,
        };

        let service = Service {
            id: Some("abcdef0123456789".to_string()),
            spec: Some(ServiceSpec {
                name: Some("demo_web".to_string()),
                mode: Some(ServiceSpecMode {
                    replicated: Some(ServiceSpecModeReplicated { replicas: Some(3) }),
                    ..Default::default()
                }),
                task_template: Some(TaskSpec {
                    container_spec: Some(TaskSpecContainerSpec {
                        image: Some("nginx:latest@sha256:deadbeef".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            service_status: Some(ServiceServiceStatus {
                running_tasks: Some(2),
                desired_tasks: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };

        let info = service_to_info(&service);
        assert_eq!(info.id, "abcdef012345");
        assert_eq!(info.name, "demo_web");
        assert_eq!(info.image, "nginx:latest");
        assert_eq!(info.mode, "replicated");
        assert_eq!(info.replicas, "2/3");
    }

    #[test]
    fn service_to_info_falls_back_to_declared_replicas() {
        use bollard::models::{ServiceSpec, ServiceSpecMode, ServiceSpecModeReplicated};

        let service = Service {
            spec: Some(ServiceSpec {
                name: Some("demo_worker".to_string()),
                mode: Some(ServiceSpecMode {
                    replicated: Some(ServiceSpecModeReplicated { replicas: Some(5) }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(service_to_info(&service).replicas, "5");
    }

    #[test]
    fn inspect_to_details_maps_config_mounts_and_networks() {
        use bollard::models::{ContainerConfig, ContainerState, ContainerStateStatusEnum, MountPoint};
        use std::collections::HashMap;

        let mut networks = HashMap::new();
        networks.insert(
            "demo_net".to_string(),
            bollard::models::EndpointSettings {
                ip_address: Some("172.18.0.2".to_string()),
                gateway: Some("172.18.0.1".to_string()),
                ..Default::default()
            },
        );

        let response = ContainerInspectResponse {
            id: Some("0123456789abcdef".to_string()),
            name: Some("/demo_web".to_string()),
            created: Some("2024-05-01T12:00:00.000000000Z".to_string()),
            restart_count: Some(2),
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::RUNNING),
                running: Some(true),
                started_at: Some(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            }),
            config: Some(ContainerConfig {
                image: Some("nginx:latest".to_string()),
                env: Some(vec!["A=1".to_string()]),
                ..Default::default()
            }),
            mounts: Some(vec![MountPoint {
                source: Some("/data".to_string()),
                destination: Some("/var/lib/data".to_string()),
                mode: Some("rw".to_string()),
                ..Default::default()
            }]),
            network_settings: Some(bollard::models::NetworkSettings {
                networks: Some(networks),
                ..Default::default()
            }),
            ..Default::default()
        };

        let details = inspect_to_details(&response);
        assert_eq!(details.id, "0123456789ab");
        assert_eq!(details.name, "demo_web");
        assert_eq!(details.image, "nginx:latest");
        assert_eq!(details.created, "2024-05-01 12:00:00");
        assert_eq!(details.status, "running");
        assert_eq!(details.env, vec!["A=1"]);
        assert_eq!(
            details.mounts,
            vec![("/data".to_string(), "/var/lib/data".to_string(), "rw".to_string())]
        );
        assert_eq!(
            details.networks,
            vec![(
                "demo_net".to_string(),
                "172.18.0.2".to_string(),
                "172.18.0.1".to_string()
            )]
        );
        assert_eq!(details.restart_count, 2);
        assert_ne!(details.uptime, "-");
    }

    #[test]
    fn stopped_container_has_no_uptime() {
        use bollard::models::{ContainerState, ContainerStateStatusEnum};

        let response = ContainerInspectResponse {
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::EXITED),
                running: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(inspect_to_details(&response).uptime, "-");
    }

    #[test]
    fn format_port_map_pairs_host_and_container_ports() {
        use bollard::models::PortBinding;
        use std::collections::HashMap;

        let mut ports: PortMap = HashMap::new();
        ports.insert(
            "80/tcp".to_string(),
            Some(vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some("8080".to_string()),
            }]),
        );
        ports.insert("9000/tcp".to_string(), None);
        assert_eq!(format_port_map(&ports), "8080->80");
    }

    #[test]
    fn summary_to_info_strips_name_slash_and_truncates_id() {
        let summary = ContainerSummary {
            id: Some("0123456789abcdef0123".to_string()),
            names: Some(vec!["/demo_web".to_string()]),
            image: Some("nginx:latest".to_string()),
            state: Some("running".to_string()),
            status: Some("Up 2 hours".to_string()),
            ..Default::default()
        };
        let info = summary_to_info(&summary);
        assert_eq!(info.id, "0123456789ab");
        assert_eq!(info.name, "demo_web");
        assert_eq!(info.image, "nginx:latest");
    }
}
