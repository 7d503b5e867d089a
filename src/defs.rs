// Copyright 2026 twrpgen Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Built-in partition tables and output formatting constants.
//!
//! The tables mirror the TWRP recovery fstab vocabulary exactly; changing an
//! entry changes what ends up in shipped device trees, so edits here should be
//! rare. Device-specific additions belong in a rules file (`gen-rules`).

/// Minimum column widths of the destination fstab. An extra separating space
/// is always emitted after each field, so the fstype column starts at byte 20,
/// the device column at byte 30 and the flags column at byte 100, lining up
/// with [`FSTAB_HEADER`]'s comment row.
pub const NAME_COL_WIDTH: usize = 19;
pub const FS_COL_WIDTH: usize = 9;
pub const DEVICE_COL_WIDTH: usize = 69;

/// Fixed preamble, written before any data row (even for an empty source).
pub const FSTAB_HEADER: &str = "\
# Android fstab file.
# The filesystem that contains the filesystem checker binary (typically /system) cannot
# specify MF_CHECK, and must come before any filesystems that do specify MF_CHECK

# mount point       fstype    device                                                                flags
";

/// Synthetic raw-image rows always carry this fstype.
pub const IMAGE_FSTYPE: &str = "emmc";
pub const IMAGE_SUFFIX: &str = "_image";

pub const ALLOWED_PARTITIONS: &[&str] = &[
    // Boot partitions
    "/boot",
    "/recovery",
    "/dtbo",
    // Standard partitions
    "/cache",
    "/odm",
    "/product",
    "/system",
    "/vendor",
    // OEM partitions
    "/cust",
    "/firmware",
    "/persist",
    // Logical partitions (bare names, no device path)
    "system",
    "odm",
    "product",
    "vendor",
];

/// Partitions that get a second row pointing at the raw block device, so TWRP
/// can flash/backup the whole image rather than the mounted filesystem.
pub const IMAGE_ENTRY_PARTITIONS: &[&str] = &["/odm", "/product", "/system", "/vendor", "/persist"];

pub const PARTITION_FLAGS: &[(&str, &str)] = &[
    ("/recovery", "flags=backup=1"),
    ("/dtbo", "flags=display=\"Dtbo\";backup=1;flashimg=1"),
    ("/odm", "flags=display=\"Odm\";backup=1"),
    ("/product", "flags=display=\"Product\";backup=1"),
    ("/system", "flags=backup=1"),
    ("/vendor", "flags=display=\"Vendor\";backup=1"),
    ("/cust", "flags=display=\"Cust\""),
    ("/firmware", "flags=display=\"Firmware\""),
    ("/persist", "flags=display=\"Persist\""),
    ("system", "flags=display=\"System\";logical"),
    ("odm", "flags=display=\"Odm\";logical"),
    ("product", "flags=display=\"Product\";logical"),
    ("vendor", "flags=display=\"Vendor\";logical"),
    ("/odm_image", "flags=display=\"Odm image\";backup=1;flashimg=1"),
    ("/product_image", "flags=display=\"Product image\";backup=1;flashimg=1"),
    ("/system_image", "flags=display=\"System image\";backup=1;flashimg=1"),
    ("/vendor_image", "flags=display=\"Vendor image\";backup=1;flashimg=1"),
    ("/persist_image", "flags=display=\"Persist image\";backup=1;flashimg=1"),
];
