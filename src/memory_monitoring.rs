use std::fs;
use std::path::PathBuf;

/// Peak RSS of this process in KB (`VmHWM` in `/proc/self/status`).
pub fn peak_rss_kb() -> Option<u64> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_hwm(&status)
}

fn parse_vm_hwm(status: &str) -> Option<u64> {
    status
        .lines()
        .find(|line| line.starts_with("VmHWM:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
}

/// Peak memory of the enclosing cgroup v2 in KB, if `memory.peak` is available.
pub fn cgroup_peak_kb() -> Option<u64> {
    let path = cgroup_path()?.join("memory.peak");
    let data = fs::read_to_string(path).ok()?;
    data.trim().parse::<u64>().ok().map(|bytes| bytes / 1024)
}

fn cgroup_path() -> Option<PathBuf> {
    let data = fs::read_to_string("/proc/self/cgroup").ok()?;
    data.lines().find_map(|line| {
        // cgroup v2 lines look like `0::/path/to/cgroup`
        let relative = line.strip_prefix("0::")?.trim_start_matches('/');
        let path = PathBuf::from("/sys/fs/cgroup").join(relative);
        path.join("memory.max").exists().then_some(path)
    })
}

/// Prefers the cgroup peak (accurate under `systemd-run` limits), falls back to peak RSS.
pub fn peak_memory_kb() -> u64 {
    cgroup_peak_kb().or_else(peak_rss_kb).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vm_hwm_line() {
        let status = "Name:\tfib-bench\nVmPeak:\t  20000 kB\nVmHWM:\t    1234 kB\nVmRSS:\t 1000 kB\n";
        assert_eq!(parse_vm_hwm(status), Some(1234));
        assert_eq!(parse_vm_hwm("Name:\tfib-bench\n"), None);
    }
}
