// Copyright 2026 twrpgen Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device fstab to TWRP recovery fstab conversion.
//!
//! Source lines look like `<device> <mount point> <fstype> ...`; extra tokens
//! (mount options, fs_mgr flags) are ignored. The mount point is the
//! identifier everything is keyed on: unlisted identifiers are filtered out,
//! listed ones become a column-aligned row, and partitions in the image set
//! get a second row pointing at the raw block device.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::defs;
use crate::rules::PartitionRules;

/// Per-conversion counters, for logging and the caller's summary line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    /// Data rows written, image rows included.
    pub rows: usize,
    /// Synthetic `_image` rows among [`rows`](Self::rows).
    pub image_rows: usize,
    /// Lines dropped because the identifier is not in the allowed table.
    pub dropped: usize,
    /// Lines skipped because they had fewer than three fields.
    pub malformed: usize,
}

/// Facts about a device fstab that feed the template context.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceFacts {
    pub has_dtbo: bool,
    pub has_vendor: bool,
    /// True when any entry uses a bare logical-partition name.
    pub has_logical: bool,
}

/// Convert `source` and write the result to `dest`.
///
/// Both files are opened per call and closed on every exit path; a failed
/// conversion leaves no descriptor behind. There is no partial-write
/// recovery: an interrupted run leaves a truncated destination, which is
/// acceptable for a single-shot batch tool.
pub fn transform(source: &Path, dest: &Path, rules: &PartitionRules) -> Result<ConvertReport> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read source fstab {}", source.display()))?;

    let (output, report) = convert(&text, rules);

    fs::write(dest, output)
        .with_context(|| format!("Failed to write recovery fstab {}", dest.display()))?;

    log::info!(
        "Wrote {} rows ({} image) to {}",
        report.rows,
        report.image_rows,
        dest.display()
    );
    Ok(report)
}

/// Pure conversion of the full fstab text. The fixed header preamble is
/// always emitted, even when the source has no usable line.
pub fn convert(text: &str, rules: &PartitionRules) -> (String, ConvertReport) {
    let mut out = String::from(defs::FSTAB_HEADER);
    let mut report = ConvertReport::default();

    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(device), Some(mount_point), Some(fstype)) =
            (fields.next(), fields.next(), fields.next())
        else {
            report.malformed += 1;
            log::warn!("Skipping malformed fstab line (fewer than 3 fields): {line:?}");
            continue;
        };

        if !rules.is_allowed(mount_point) {
            report.dropped += 1;
            log::debug!("Dropping unrecognized partition {mount_point}");
            continue;
        }

        push_row(&mut out, mount_point, fstype, device, rules.flags_for(mount_point));
        report.rows += 1;

        if rules.needs_image_entry(mount_point) {
            let image_id = format!("{mount_point}{}", defs::IMAGE_SUFFIX);
            push_row(&mut out, &image_id, defs::IMAGE_FSTYPE, device, rules.flags_for(&image_id));
            report.rows += 1;
            report.image_rows += 1;
        }
    }

    (out, report)
}

/// Scan a device fstab for the partition facts the templates care about.
pub fn device_facts(text: &str) -> DeviceFacts {
    let mut facts = DeviceFacts::default();
    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(mount_point) = line.split_whitespace().nth(1) else {
            continue;
        };
        match mount_point {
            "/dtbo" => facts.has_dtbo = true,
            "/vendor" | "vendor" => facts.has_vendor = true,
            _ => {}
        }
        if !mount_point.starts_with('/') {
            facts.has_logical = true;
        }
    }
    facts
}

fn push_row(out: &mut String, name: &str, fstype: &str, device: &str, flags: &str) {
    push_padded(out, name, defs::NAME_COL_WIDTH);
    push_padded(out, fstype, defs::FS_COL_WIDTH);
    push_padded(out, device, defs::DEVICE_COL_WIDTH);
    out.push_str(flags);
    out.push('\n');
}

/// Write `field` followed by enough spaces to reach `width` plus one
/// separating space. An overlong field still gets one space, so columns
/// shift right instead of colliding.
fn push_padded(out: &mut String, field: &str, width: usize) {
    out.push_str(field);
    let pad = width.saturating_sub(field.len()) + 1;
    for _ in 0..pad {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BY_NAME: &str = "/dev/block/bootdevice/by-name";

    fn rules() -> PartitionRules {
        PartitionRules::default()
    }

    fn data_rows(output: &str) -> Vec<&str> {
        // Everything after the fixed preamble
        output
            .strip_prefix(defs::FSTAB_HEADER)
            .expect("header missing")
            .lines()
            .collect()
    }

    #[test]
    fn header_only_for_empty_input() {
        let (out, report) = convert("", &rules());
        assert_eq!(out, defs::FSTAB_HEADER);
        assert_eq!(report, ConvertReport::default());
    }

    #[test]
    fn comments_and_blanks_produce_nothing() {
        let input = "# stock fstab\n\n# another comment\n";
        let (out, report) = convert(input, &rules());
        assert!(data_rows(&out).is_empty());
        assert_eq!(report.rows, 0);
        assert_eq!(report.malformed, 0);
    }

    #[test]
    fn allowed_partition_yields_one_aligned_row() {
        let input = format!("{BY_NAME}/boot /boot emmc defaults defaults\n");
        let (out, report) = convert(&input, &rules());

        let rows = data_rows(&out);
        assert_eq!(rows.len(), 1);
        assert_eq!(report.rows, 1);
        assert_eq!(report.image_rows, 0);

        let row = rows[0];
        assert!(row.starts_with("/boot "));
        // Column starts match the header comment row
        assert_eq!(&row[20..24], "emmc");
        assert_eq!(&row[30..30 + BY_NAME.len() + 5], format!("{BY_NAME}/boot"));
        // /boot has no flags entry: empty trailing field
        assert_eq!(row.trim_end(), format!("/boot               emmc      {BY_NAME}/boot"));
    }

    #[test]
    fn image_partition_yields_two_rows() {
        let device = format!("{BY_NAME}/system");
        let input = format!("{device} /system ext4 ro,barrier=1 wait\n");
        let (out, report) = convert(&input, &rules());

        let rows = data_rows(&out);
        assert_eq!(rows.len(), 2);
        assert_eq!(report.rows, 2);
        assert_eq!(report.image_rows, 1);

        assert_eq!(
            rows[0],
            format!("/system             ext4      {device}                                  flags=backup=1")
        );
        assert_eq!(
            rows[1],
            format!(
                "/system_image       emmc      {device}                                  \
                 flags=display=\"System image\";backup=1;flashimg=1"
            )
        );
    }

    #[test]
    fn image_row_shares_device_and_uses_emmc() {
        for id in ["/odm", "/product", "/vendor", "/persist"] {
            let device = format!("{BY_NAME}{id}");
            let input = format!("{device} {id} ext4 ro wait\n");
            let (out, _) = convert(&input, &rules());

            let rows = data_rows(&out);
            assert_eq!(rows.len(), 2, "expected two rows for {id}");

            let fields: Vec<&str> = rows[1].split_whitespace().collect();
            assert_eq!(fields[0], format!("{id}_image"));
            assert_eq!(fields[1], "emmc");
            assert_eq!(fields[2], device);
        }
    }

    #[test]
    fn unknown_partition_is_filtered() {
        let input = format!("{BY_NAME}/oem /oem ext4 ro wait\n");
        let (out, report) = convert(&input, &rules());
        assert!(data_rows(&out).is_empty());
        assert_eq!(report.dropped, 1);
        assert_eq!(report.rows, 0);
    }

    #[test]
    fn logical_partition_gets_logical_flag_and_no_image_row() {
        let input = "system /system ext4 ro wait,logical\nvendor vendor ext4 ro wait,logical\n";
        let (out, report) = convert(input, &rules());

        let rows = data_rows(&out);
        assert_eq!(rows.len(), 3); // /system + /system_image + vendor
        assert_eq!(report.image_rows, 1);
        assert_eq!(
            rows[2],
            "vendor              ext4      vendor                                                                flags=display=\"Vendor\";logical"
        );
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let input = format!("short line\n   \n{BY_NAME}/recovery /recovery emmc defaults defaults\n");
        let (out, report) = convert(&input, &rules());

        let rows = data_rows(&out);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("/recovery "));
        assert!(rows[0].ends_with("flags=backup=1"));
        // "short line" has 2 fields, the whitespace-only line has none
        assert_eq!(report.malformed, 2);
    }

    #[test]
    fn overlong_field_still_gets_one_space() {
        let mut rules = rules();
        let long_id = "/a_partition_name_longer_than_the_column";
        rules.allowed.push(long_id.to_string());

        let input = format!("{BY_NAME}{long_id} {long_id} ext4 ro wait\n");
        let (out, _) = convert(&input, &rules);

        let row = data_rows(&out)[0];
        assert!(row.starts_with(&format!("{long_id} ext4")));
        assert!(!row.contains(&format!("{long_id}ext4")));
    }

    #[test]
    fn source_order_is_preserved() {
        let input = format!(
            "{BY_NAME}/recovery /recovery emmc defaults defaults\n\
             {BY_NAME}/cache /cache ext4 nosuid,nodev wait\n\
             {BY_NAME}/boot /boot emmc defaults defaults\n"
        );
        let (out, _) = convert(&input, &rules());
        let names: Vec<&str> = data_rows(&out)
            .iter()
            .map(|r| r.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(names, ["/recovery", "/cache", "/boot"]);
    }

    #[test]
    fn duplicate_entries_are_both_written() {
        let input = format!(
            "{BY_NAME}/boot /boot emmc defaults defaults\n\
             {BY_NAME}/boot /boot emmc defaults defaults\n"
        );
        let (out, report) = convert(&input, &rules());
        assert_eq!(data_rows(&out).len(), 2);
        assert_eq!(report.rows, 2);
    }

    #[test]
    fn device_facts_scan() {
        let input = format!(
            "{BY_NAME}/dtbo /dtbo emmc defaults defaults\n\
             system /system ext4 ro wait,logical\n\
             vendor vendor ext4 ro wait,logical\n"
        );
        let facts = device_facts(&input);
        assert!(facts.has_dtbo);
        assert!(facts.has_vendor);
        assert!(facts.has_logical);

        let plain = format!("{BY_NAME}/boot /boot emmc defaults defaults\n");
        let facts = device_facts(&plain);
        assert!(!facts.has_dtbo);
        assert!(!facts.has_vendor);
        assert!(!facts.has_logical);
    }

    #[test]
    fn transform_reads_and_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("fstab.qcom");
        let dst = dir.path().join("recovery.fstab");
        fs::write(&src, format!("{BY_NAME}/system /system ext4 ro wait\n")).unwrap();

        let report = transform(&src, &dst, &rules()).unwrap();
        assert_eq!(report.rows, 2);

        let written = fs::read_to_string(&dst).unwrap();
        assert!(written.starts_with(defs::FSTAB_HEADER));
        assert!(written.contains("/system_image"));
    }

    #[test]
    fn transform_missing_source_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = transform(
            Path::new("/nonexistent/fstab"),
            &dir.path().join("out"),
            &rules(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/fstab"));
    }

    #[test]
    fn transform_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("fstab");
        fs::write(&src, "").unwrap();

        let err = transform(&src, &dir.path().join("missing/dir/out"), &rules()).unwrap_err();
        assert!(format!("{err:#}").contains("missing/dir/out"));
    }
}
