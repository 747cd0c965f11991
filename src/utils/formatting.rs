//! Text formatting utilities for the viewer.

use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

/// Formats a time in milliseconds as `m:ss.mmm`, or `h:mm:ss.mmm` past one hour.
pub fn format_time_ms(ms: f64) -> String {
    let sign = if ms < 0.0 { "-" } else { "" };
    let total_ms = ms.abs().round() as u64;
    let millis = total_ms % 1000;
    let total_s = total_ms / 1000;
    let (h, m, s) = (total_s / 3600, (total_s / 60) % 60, total_s % 60);
    if h > 0 {
        format!("{}{}:{:02}:{:02}.{:03}", sign, h, m, s, millis)
    } else {
        format!("{}{}:{:02}.{:03}", sign, m, s, millis)
    }
}

/// Short label for a time scale: `500 ms`, `10 s`, `2 min`.
pub fn format_time_scale(ms: u64) -> String {
    if ms < 1000 {
        format!("{} ms", ms)
    } else if ms % 60_000 == 0 {
        format!("{} min", ms / 60_000)
    } else if ms % 1000 == 0 {
        format!("{} s", ms / 1000)
    } else {
        format!("{:.1} s", ms as f64 / 1000.0)
    }
}

/// Gets the current process memory usage in megabytes.
///
/// Returns 0.0 if the process information cannot be retrieved.
pub fn get_current_memory_mb() -> f64 {
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::new().with_memory()),
    );
    sys.refresh_processes_specifics(ProcessRefreshKind::new().with_memory());

    if let Some(process) = sys.process(Pid::from_u32(std::process::id())) {
        process.memory() as f64 / (1024.0 * 1024.0)
    } else {
        0.0
    }
}

pub fn format_memory_mb(memory_mb: f64) -> String {
    if memory_mb > 1024.0 {
        format!("Memory: {:.2} GB", memory_mb / 1024.0)
    } else {
        format!("Memory: {:.1} MB", memory_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_ms() {
        assert_eq!(format_time_ms(0.0), "0:00.000");
        assert_eq!(format_time_ms(83_456.0), "1:23.456");
        assert_eq!(format_time_ms(3_725_000.4), "1:02:05.000");
        assert_eq!(format_time_ms(-1500.0), "-0:01.500");
    }

    #[test]
    fn test_format_time_scale() {
        assert_eq!(format_time_scale(500), "500 ms");
        assert_eq!(format_time_scale(10_000), "10 s");
        assert_eq!(format_time_scale(120_000), "2 min");
        assert_eq!(format_time_scale(2_500), "2.5 s");
    }

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory_mb(512.5), "Memory: 512.5 MB");
        assert_eq!(format_memory_mb(2048.0), "Memory: 2.00 GB");
    }
}
