use romhex::*;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

fn test_file_path(name: &str) -> PathBuf {
    let output = process::Command::new(env!("CARGO"))
        .arg("locate-project")
        .arg("--workspace")
        .arg("--message-format=plain")
        .output()
        .unwrap()
        .stdout;
    let cargo_toml_path = String::from_utf8(output).unwrap();

    let mut path = PathBuf::from(cargo_toml_path.trim())
        .parent()
        .unwrap()
        .join("test_files");
    path.push(name);
    path
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("romhex-{}-{name}", process::id()))
}

#[test]
fn merge_two_files_into_small_rom() {
    let config = MergeConfig {
        rom_size: 16,
        fill: 0x00,
        offset: 0,
        ..MergeConfig::default()
    };
    let inputs = [test_file_path("merge_a.hex"), test_file_path("merge_b.hex")];
    let output = scratch_path("merged.hex");

    let summary = merge_files(&config, &output, &inputs[..]).expect("merge failed");
    assert_eq!(summary.bytes_read, 4);
    assert_eq!(summary.skipped, 0);

    let mut image = ImageBuffer::new(16, 0, 0x00).expect("image");
    read_hex_file(&output, &mut image).expect("read back failed");
    assert_eq!(
        image.bytes(),
        &[0xaa, 0xbb, 0xcc, 0xdd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    let text = fs::read_to_string(&output).expect("read output");
    assert!(text.ends_with(":00000001FF\n"));
    fs::remove_file(&output).expect("cleanup");
}

#[test]
fn text_file_to_hex() {
    let config = TextConfig {
        address: 0x2000,
        ..TextConfig::default()
    };
    let input = BufReader::new(File::open(test_file_path("hello.txt")).expect("open failed"));
    let mut output = Vec::new();
    let size = text_to_hex(&config, input, &mut output).expect("convert failed");
    assert_eq!(size.counted, 8);

    let mut image = ImageBuffer::new(8, 0x2000, 0xff).expect("image");
    let count = read_hex(output.as_slice(), &mut image).expect("decode failed");
    assert_eq!(count, 8);
    assert_eq!(image.bytes(), &[0x48, 0x45, 0x4c, 0x4c, 0x4f, 0x0d, 0x0a, 0x00]);

    let first = String::from_utf8(output).expect("utf-8");
    assert!(first.starts_with(":08200000"));
}

#[test]
fn later_fragment_must_agree() {
    let first = format!("{}\n{EOF_RECORD}\n", encode_data_record(0x0100, &[0x12]));
    let same = format!("{}\n{EOF_RECORD}\n", encode_data_record(0x0100, &[0x12]));
    let different = format!("{}\n{EOF_RECORD}\n", encode_data_record(0x0100, &[0x34]));

    let mut merge = Merge::new(&MergeConfig::default()).expect("merge");
    merge.add_hex(first.as_bytes()).expect("first");
    merge.add_hex(same.as_bytes()).expect("identical rewrite");
    let error = merge.add_hex(different.as_bytes()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::WriteConflict);
    assert_eq!(merge.total(), 2);
}

#[test]
fn record_past_capacity_after_offset() {
    let hex = format!("{}\n{EOF_RECORD}\n", encode_data_record(0x80fe, &[1, 2, 3]));
    let mut image = ImageBuffer::new(0x100, 0x8000, 0xff).expect("image");
    let error = read_hex(hex.as_bytes(), &mut image).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AddressOutOfRange);
}

#[test]
fn offset_image_round_trip() {
    let config = MergeConfig {
        rom_size: 0x20,
        offset: 0x8000,
        ..MergeConfig::default()
    };
    let mut merge = Merge::new(&config).expect("merge");
    merge.add_file(test_file_path("offset_8000.hex")).expect("load failed");

    let mut output = Vec::new();
    let records = merge.write_hex(&mut output, LineEnding::CrLf).expect("write failed");
    assert_eq!(records, 2);

    let mut copy = config.image().expect("image");
    read_hex(output.as_slice(), &mut copy).expect("decode failed");
    assert_eq!(copy.bytes(), merge.image().bytes());
}
