//! Host resource checks for `pitchwise doctor`
//!
//! Collects CPU, memory and disk figures with sysinfo and compares them with
//! the minimums needed to run the service.

use serde::Serialize;
use std::path::Path;
use sysinfo::{Disks, System};

const GIB: u64 = 1024 * 1024 * 1024;

/// Minimum host resources
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Requirements {
    pub min_cpu_cores: usize,
    pub min_memory: u64,
    pub min_free_disk: u64,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            min_cpu_cores: 2,
            min_memory: 2 * GIB,
            min_free_disk: GIB,
        }
    }
}

/// Measured host resources
#[derive(Debug, Clone, Serialize)]
pub struct HostFacts {
    pub os: String,
    pub cpu_cores: usize,
    pub total_memory: u64,
    pub available_memory: u64,
    /// Mount point holding the working directory
    pub disk_mount: Option<String>,
    pub free_disk: u64,
}

impl HostFacts {
    pub fn collect(working_dir: &Path) -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        let disks = Disks::new_with_refreshed_list();
        // Deepest mount point containing the directory
        let disk = disks
            .iter()
            .filter(|d| working_dir.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len());

        HostFacts {
            os: format!(
                "{} {}",
                System::name().unwrap_or_else(|| String::from("Unknown")),
                System::os_version().unwrap_or_default()
            )
            .trim()
            .to_string(),
            cpu_cores: system.cpus().len(),
            total_memory: system.total_memory(),
            available_memory: system.available_memory(),
            disk_mount: disk.map(|d| d.mount_point().to_string_lossy().to_string()),
            free_disk: disk.map(|d| d.available_space()).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub required: String,
    pub found: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub facts: HostFacts,
    pub checks: Vec<Check>,
}

impl DoctorReport {
    pub fn evaluate(facts: HostFacts, requirements: &Requirements) -> Self {
        let checks = vec![
            Check {
                name: "cpu",
                required: format!("{} cores", requirements.min_cpu_cores),
                found: format!("{} cores", facts.cpu_cores),
                passed: facts.cpu_cores >= requirements.min_cpu_cores,
            },
            Check {
                name: "memory",
                required: format_bytes(requirements.min_memory),
                found: format_bytes(facts.total_memory),
                passed: facts.total_memory >= requirements.min_memory,
            },
            Check {
                name: "disk",
                required: format!("{} free", format_bytes(requirements.min_free_disk)),
                found: format!(
                    "{} free on {}",
                    format_bytes(facts.free_disk),
                    facts.disk_mount.as_deref().unwrap_or("unknown disk")
                ),
                passed: facts.free_disk >= requirements.min_free_disk,
            },
        ];
        Self { facts, checks }
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Format bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= GIB {
        format!("{:.2} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(cores: usize, memory: u64, disk: u64) -> HostFacts {
        HostFacts {
            os: "Linux".to_string(),
            cpu_cores: cores,
            total_memory: memory,
            available_memory: memory / 2,
            disk_mount: Some("/".to_string()),
            free_disk: disk,
        }
    }

    #[test]
    fn test_meets_minimums() {
        let report = DoctorReport::evaluate(facts(4, 8 * GIB, 20 * GIB), &Requirements::default());
        assert!(report.passed());
        assert_eq!(report.checks.len(), 3);
    }

    #[test]
    fn test_each_shortfall_fails() {
        let requirements = Requirements::default();
        for (cores, memory, disk, failing) in [
            (1, 8 * GIB, 20 * GIB, "cpu"),
            (4, GIB, 20 * GIB, "memory"),
            (4, 8 * GIB, GIB / 2, "disk"),
        ] {
            let report = DoctorReport::evaluate(facts(cores, memory, disk), &requirements);
            assert!(!report.passed());
            let failed: Vec<_> = report
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.name)
                .collect();
            assert_eq!(failed, vec![failing]);
        }
    }

    #[test]
    fn test_exact_minimum_passes() {
        let report = DoctorReport::evaluate(facts(2, 2 * GIB, GIB), &Requirements::default());
        assert!(report.passed());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2 * GIB), "2.00 GB");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MB");
    }
}
