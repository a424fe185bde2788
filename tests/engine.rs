use dyno_merge::{
    sniff, CanonicalRecord, ChannelMatch, ColumnNaming, EngineConfig, ErrorKind, FormatKind,
    LengthPolicy, ParseEngine, SourceFile,
};

const TOLERANCE: f64 = 1e-9;

fn ine_file(data_rows: &[(f64, f64)]) -> Vec<u8> {
    let mut text = String::new();
    for i in 0..24 {
        text.push_str(&format!("Ensayo n\u{fa}mero {i} - Dinam\u{f3}metro\n"));
    }
    text.push_str("TIEMPO RPM_VEH RPM_ROD TORQUE POT_PER POT_CIGUE POT_RUEDA SENSOR AUX1\n");
    text.push_str("s Rpm Rpm Kgm Cv Cv Cv\n");
    for (i, (rpm, hp)) in data_rows.iter().enumerate() {
        text.push_str(&format!("{i} {rpm} 0 0 0 0 {hp} 0 0\n"));
    }
    text.chars().map(|c| c as u32 as u8).collect()
}

fn ad3_file(channels: &[(&str, &str)]) -> Vec<u8> {
    let body: String = channels
        .iter()
        .map(|(name, samples)| {
            format!(
                "<CanalVirtual><Nombre>{name}</Nombre><Unidad>-</Unidad><Muestra>{samples}</Muestra></CanalVirtual>"
            )
        })
        .collect();
    format!("<?xml version=\"1.0\"?><Archivo><Ensayo>{body}</Ensayo></Archivo>").into_bytes()
}

#[test]
fn sniffing_known_and_unknown_names() {
    assert_eq!(sniff("pull.csv").unwrap(), FormatKind::GenericCsv);
    assert_eq!(sniff("pull.ine").unwrap(), FormatKind::PseudoCsv);
    assert_eq!(sniff("pull.ad3").unwrap(), FormatKind::VendorXml);
    assert_eq!(sniff("pull.xlsx").unwrap_err().kind(), ErrorKind::UnknownFormat);
}

#[test]
fn pseudo_csv_reverses_rows_and_derives_torque() {
    let rows = [(5000.0, 95.0), (4000.0, 80.0), (3000.0, 55.5), (2000.0, 31.0)];
    let series = ParseEngine::default()
        .parse_file(&ine_file(&rows), "horacio.ine")
        .unwrap();

    assert_eq!(series.label, "horacio");
    assert_eq!(series.len(), rows.len());
    for (record, (rpm, hp)) in series.records.iter().zip(rows.iter().rev()) {
        assert_eq!(record.rpm, *rpm);
        assert_eq!(record.horsepower, *hp);
        assert!((record.torque - hp * 716.0 / rpm).abs() < TOLERANCE);
    }
    assert!(series.rejected.is_empty());
}

#[test]
fn pseudo_csv_zero_rpm_is_arithmetic_failure() {
    let rows = [(3000.0, 55.0), (0.0, 0.0), (2000.0, 31.0)];
    let series = ParseEngine::default()
        .parse_file(&ine_file(&rows), "zero.ine")
        .unwrap();

    assert_eq!(series.len(), 2);
    assert!(series.records.iter().all(|r| r.torque.is_finite()));
    assert_eq!(series.rejected.len(), 1);
    assert_eq!(series.rejected[0].error.kind(), ErrorKind::ArithmeticFailure);
    // preamble 1-24, header 25, units 26, rows from 27
    assert_eq!(series.rejected[0].line, 28);
}

#[test]
fn vendor_xml_channels_fill_the_series() {
    let bytes = ad3_file(&[
        ("RPM Motor", "2000, 3000, 4000, 5000"),
        ("Torque Corr", "11.2, 13.1, 14.0, 12.4"),
        ("Potencia Corr", "31.3, 54.9, 78.2, 86.6"),
    ]);
    let series = ParseEngine::default().parse_file(&bytes, "mwd.ad3").unwrap();

    assert_eq!(series.len(), 4);
    assert_eq!(
        series.records[1],
        CanonicalRecord {
            rpm: 3000.0,
            torque: 13.1,
            horsepower: 54.9
        }
    );
}

#[test]
fn vendor_xml_duplicate_channel_overwrites() {
    let bytes = ad3_file(&[
        ("RPM Motor", "1000, 2000"),
        ("Torque Corr", "10, 11"),
        ("Potencia Corr", "14, 31"),
        ("RPM Motor", "1100, 2100"),
    ]);
    let series = ParseEngine::default().parse_file(&bytes, "mwd.ad3").unwrap();
    let rpm: Vec<f64> = series.records.iter().map(|r| r.rpm).collect();
    assert_eq!(rpm, vec![1100.0, 2100.0]);
}

#[test]
fn vendor_xml_length_policy() {
    let bytes = ad3_file(&[
        ("RPM Motor", "1000, 2000, 3000"),
        ("Torque Corr", "10, 11"),
        ("Potencia Corr", "14, 31, 40"),
    ]);

    let err = ParseEngine::default().parse_file(&bytes, "mwd.ad3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedTable);

    let truncate = ParseEngine::new(EngineConfig {
        length_policy: LengthPolicy::Truncate,
        ..EngineConfig::default()
    });
    assert_eq!(truncate.parse_file(&bytes, "mwd.ad3").unwrap().len(), 2);
}

#[test]
fn vendor_xml_non_numeric_sample() {
    let bytes = ad3_file(&[
        ("RPM Motor", "1000, n/a"),
        ("Torque Corr", "10, 11"),
        ("Potencia Corr", "14, 31"),
    ]);
    let err = ParseEngine::default().parse_file(&bytes, "mwd.ad3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedTable);
}

#[test]
fn vendor_xml_exact_matching_applies_to_every_label() {
    let bytes = ad3_file(&[
        ("RPM MOTOR", "1000"),
        ("torque corr", "10"),
        ("POTENCIA CORR", "14"),
    ]);
    let exact = ParseEngine::new(EngineConfig {
        channel_match: ChannelMatch::Exact,
        ..EngineConfig::default()
    });
    assert!(exact.parse_file(&bytes, "mwd.ad3").unwrap().is_empty());
    assert_eq!(ParseEngine::default().parse_file(&bytes, "mwd.ad3").unwrap().len(), 1);
}

#[test]
fn generic_csv_round_trip() {
    let series = ParseEngine::default()
        .parse_file(b"rpm,hp,tq\n1000,50,35\n", "base.csv")
        .unwrap();
    assert_eq!(
        series.records,
        vec![CanonicalRecord {
            rpm: 1000.0,
            torque: 35.0,
            horsepower: 50.0
        }]
    );
}

#[test]
fn batch_with_one_bad_file_still_yields_the_good_one() {
    let mut bad = "preamble\n".repeat(24);
    bad.push_str("TIEMPO RPM_VEH TORQUE\ns Rpm Kgm\n0 3000 12\n");

    let files = vec![
        SourceFile::new("good.ine", ine_file(&[(3000.0, 55.0), (2000.0, 31.0)])),
        SourceFile::new("bad.ine", bad),
    ];
    let report = ParseEngine::default().parse(&files);

    assert_eq!(report.dataset.len(), 1);
    assert_eq!(report.dataset.series[0].label, "good");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].filename, "bad.ine");
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].kind(), ErrorKind::MalformedTable);
}

#[test]
fn mixed_batch_overlay() {
    let files = vec![
        SourceFile::new("stock.csv", "rpm,hp,tq\n3000,50,11.9\n4000,70,12.5\n"),
        SourceFile::new(
            "tuned.ad3",
            ad3_file(&[
                ("RPM Motor", "3000, 4000"),
                ("Torque Corr", "12.8, 13.6"),
                ("Potencia Corr", "53.6, 76"),
            ]),
        ),
        SourceFile::new("stock.csv", "rpm,hp,tq\n3000,51,12.1\n"),
    ];
    let report = ParseEngine::default().parse(&files);
    assert!(report.is_complete());
    assert_eq!(report.dataset.labels(), vec!["stock", "tuned", "stock"]);

    let traces = report.dataset.overlay_traces();
    let names: Vec<&str> = traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["whp stock", "tq stock", "whp tuned", "tq tuned", "whp stock", "tq stock"]
    );

    let view = report.dataset.series[1].table(ColumnNaming::Overlay);
    assert_eq!(view.columns, ["rpm", "whp tuned", "tq tuned"]);
    assert_eq!(view.rows[1], [4000.0, 76.0, 13.6]);
}
