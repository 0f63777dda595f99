//! Integration tests for .t3r parsing and batch extraction.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use t3chomp::batch::BatchExtractor;
use t3chomp::t3r::{AssayCategory, LogpResultFile, PkaResultFile, PkaType, T3rError};

/// Single-pKa document using the fast/mean result location.
const PKA_FAST_UV: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DirectControlAssayResultsFile>
  <Summary>
    <AssayName>Fast UV psKa</AssayName>
    <StartTime>2024-03-18T09:15:00</StartTime>
    <SampleName>OCNT-0000018-AQ-001</SampleName>
  </Summary>
  <AssayData>
    <AssayTemplate>
      <Category>pKa</Category>
    </AssayTemplate>
  </AssayData>
  <ProcessedData>
    <AssayQuality><Quality>Good</Quality></AssayQuality>
    <FastDpasMeanResult>
      <MeanPkaResults size="1">8.11591</MeanPkaResults>
      <MeanPkasStdDevs size="1">0.203242</MeanPkasStdDevs>
      <MeanPkasAverageIonicStrength size="1">0.15</MeanPkasAverageIonicStrength>
      <MeanPkasAverageTemperature size="1">24.9</MeanPkasAverageTemperature>
    </FastDpasMeanResult>
    <PhMetricModel>
      <Sample>
        <Pka>
          <PkaType><Value>Base</Value></PkaType>
          <PkaValue><Value>8.23</Value><Source>Prediction</Source></PkaValue>
        </Pka>
      </Sample>
    </PhMetricModel>
    <Sweep>
      <FastDpasResult>
        <CosolventRatio>
          <CosolventName>MeOH</CosolventName>
          <WtFraction>0.32</WtFraction>
        </CosolventRatio>
      </FastDpasResult>
    </Sweep>
    <Sweep>
      <FastDpasResult>
        <CosolventRatio>
          <CosolventName>MeOH</CosolventName>
          <WtFraction>0.41</WtFraction>
        </CosolventRatio>
      </FastDpasResult>
    </Sweep>
  </ProcessedData>
</DirectControlAssayResultsFile>
"#;

/// Two-pKa document: parallel value lists plus two predictions.
const PKA_TWO_VALUES: &str = r#"<?xml version="1.0"?>
<DirectControlAssayResultsFile>
  <Summary>
    <AssayName>Fast UV psKa</AssayName>
    <StartTime>2024-03-18T11:40:00</StartTime>
    <SampleName>OCNT-0000042-AQ-001</SampleName>
  </Summary>
  <AssayData>
    <AssayTemplate><Category>pKa</Category></AssayTemplate>
  </AssayData>
  <ProcessedData>
    <AssayQuality><Quality>Good</Quality></AssayQuality>
    <FastDpasMeanResult>
      <MeanPkaResults size="2">2.86 9.64</MeanPkaResults>
      <MeanPkasStdDevs size="2">0.05 0.03</MeanPkasStdDevs>
      <MeanPkasAverageIonicStrength size="2">0.15 0.16</MeanPkasAverageIonicStrength>
      <MeanPkasAverageTemperature size="2">25.0 25.1</MeanPkasAverageTemperature>
    </FastDpasMeanResult>
    <PhMetricModel>
      <Sample>
        <Pka>
          <PkaType><Value>Acid</Value></PkaType>
          <PkaValue><Value>2.9</Value><Source>Prediction</Source></PkaValue>
        </Pka>
        <Pka>
          <PkaType><Value>Base</Value></PkaType>
          <PkaValue><Value>9.5</Value><Source>Prediction</Source></PkaValue>
        </Pka>
      </Sample>
    </PhMetricModel>
  </ProcessedData>
</DirectControlAssayResultsFile>
"#;

/// Document reporting pKas only through the dielectric fit.
const PKA_DIELECTRIC: &str = r#"<?xml version="1.0"?>
<DirectControlAssayResultsFile>
  <Summary>
    <AssayName>UV-metric psKa</AssayName>
    <StartTime>2024-03-20T14:05:00</StartTime>
    <SampleName>OCNT-0000077-AQ-001</SampleName>
  </Summary>
  <AssayData>
    <AssayTemplate><Category>pKa</Category></AssayTemplate>
  </AssayData>
  <ProcessedData>
    <AssayQuality><Quality>Acceptable</Quality></AssayQuality>
    <YasudaShedlovskyResult>
      <DielectricFit>
        <YasudaShedlovskyFit>
          <AqueousPka>4.21</AqueousPka>
          <ConfidenceInterval>0.11</ConfidenceInterval>
          <AverageIonicStrength>0.15</AverageIonicStrength>
          <AverageTemperature>25.2</AverageTemperature>
        </YasudaShedlovskyFit>
      </DielectricFit>
    </YasudaShedlovskyResult>
    <PhMetricModel>
      <Sample>
        <Pka>
          <PkaType><Value>acid</Value></PkaType>
          <PkaValue><Value>4.4</Value><Source>Prediction</Source></PkaValue>
        </Pka>
      </Sample>
    </PhMetricModel>
  </ProcessedData>
</DirectControlAssayResultsFile>
"#;

/// pKa document with no result data in either location.
const PKA_NO_DATA: &str = r#"<?xml version="1.0"?>
<DirectControlAssayResultsFile>
  <Summary>
    <AssayName>Fast UV psKa</AssayName>
    <StartTime>2024-03-18T16:00:00</StartTime>
    <SampleName>OCNT-0000099-AQ-001</SampleName>
  </Summary>
  <AssayData>
    <AssayTemplate><Category>pKa</Category></AssayTemplate>
  </AssayData>
  <ProcessedData>
    <AssayQuality><Quality>Poor</Quality></AssayQuality>
    <PhMetricModel>
      <Sample>
        <Pka>
          <PkaType><Value>Base</Value></PkaType>
          <PkaValue><Value>8.0</Value><Source>Prediction</Source></PkaValue>
        </Pka>
      </Sample>
    </PhMetricModel>
  </ProcessedData>
</DirectControlAssayResultsFile>
"#;

const LOGP_OCTANOL: &str = r#"<?xml version="1.0"?>
<DirectControlAssayResultsFile>
  <Summary>
    <AssayName>pH-metric medium logP octanol</AssayName>
    <StartTime>2024-03-19T10:00:00</StartTime>
    <SampleName>OCNT-0000018-AQ-001</SampleName>
  </Summary>
  <AssayData>
    <AssayTemplate>
      <Category>LogP</Category>
      <Settings>
        <PartitionType><Value type="string">Octanol</Value></PartitionType>
      </Settings>
    </AssayTemplate>
  </AssayData>
  <ProcessedData>
    <AssayQuality><Quality>Good</Quality></AssayQuality>
    <MultisweepPhMetricResult>
      <Rmsd>0.0516447</Rmsd>
      <MultisweepPhMetricLevelResult>
        <SampleValues>
          <Logp>1.98</Logp>
          <Logp>2.12231</Logp>
        </SampleValues>
      </MultisweepPhMetricLevelResult>
    </MultisweepPhMetricResult>
  </ProcessedData>
</DirectControlAssayResultsFile>
"#;

fn write_t3r(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn pka_document_normalizes_fast_uv_result() {
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "fast_uv.t3r", PKA_FAST_UV);

    let doc = PkaResultFile::open(&path).unwrap();
    assert_eq!(doc.file().sample_name().unwrap(), "OCNT-0000018-AQ-001");
    assert_eq!(doc.file().assay_name().unwrap(), "Fast UV psKa");
    assert_eq!(doc.file().assay_quality().unwrap(), "Good");
    assert_eq!(
        doc.file().assay_category().unwrap(),
        AssayCategory::Pka
    );
    let start = doc.file().assay_start_time().unwrap();
    assert_eq!(start.to_string(), "2024-03-18 09:15:00");

    let measured = doc.measured_pkas().unwrap();
    assert_eq!(measured.len(), 1);
    assert_eq!(measured[0].value, 8.11591);
    assert_eq!(measured[0].std, Some(0.203242));
    assert_eq!(measured[0].ionic_strength, Some(0.15));
    assert_eq!(measured[0].temperature, Some(24.9));
    assert_eq!(measured[0].pka_type, Some(PkaType::Base));

    let predicted = doc.predicted_pkas().unwrap();
    assert_eq!(predicted.len(), 1);
    assert_eq!(predicted[0].value, 8.23);
    assert_eq!(predicted[0].source.as_deref(), Some("Prediction"));

    assert_eq!(doc.cosolvent_name().as_deref(), Some("MeOH"));
    assert_eq!(doc.cosolvent_fractions(), Some(vec![0.32, 0.41]));
}

#[test]
fn formatted_pkas_pair_predicted_type_with_measured_value() {
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "fast_uv.t3r", PKA_FAST_UV);
    let doc = PkaResultFile::open(&path).unwrap();
    assert_eq!(doc.formatted_pkas().unwrap(), "base,8.11591");

    let path = write_t3r(dir.path(), "two.t3r", PKA_TWO_VALUES);
    let doc = PkaResultFile::open(&path).unwrap();
    assert_eq!(doc.formatted_pkas().unwrap(), "acid,2.86,base,9.64");
}

#[test]
fn wrong_assay_category_is_rejected_both_ways() {
    let dir = tempdir().unwrap();
    let pka_path = write_t3r(dir.path(), "pka.t3r", PKA_FAST_UV);
    let logp_path = write_t3r(dir.path(), "logp.t3r", LOGP_OCTANOL);

    let err = PkaResultFile::open(&logp_path).unwrap_err();
    assert!(matches!(
        err,
        T3rError::WrongAssayType {
            expected: AssayCategory::Pka,
            found: AssayCategory::Logp,
        }
    ));

    let err = LogpResultFile::open(&pka_path).unwrap_err();
    assert!(matches!(
        err,
        T3rError::WrongAssayType {
            expected: AssayCategory::Logp,
            found: AssayCategory::Pka,
        }
    ));
}

#[test]
fn dielectric_fit_is_used_when_fast_result_is_absent() {
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "dielectric.t3r", PKA_DIELECTRIC);

    let doc = PkaResultFile::open(&path).unwrap();
    let measured = doc.measured_pkas().unwrap();
    assert_eq!(measured.len(), 1);
    assert_eq!(measured[0].value, 4.21);
    assert_eq!(measured[0].std, Some(0.11));
    assert_eq!(measured[0].pka_type, Some(PkaType::Acid));
    assert_eq!(doc.formatted_pkas().unwrap(), "acid,4.21");
}

#[test]
fn missing_pka_data_in_both_locations_is_an_error() {
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "empty.t3r", PKA_NO_DATA);

    let doc = PkaResultFile::open(&path).unwrap();
    assert!(matches!(doc.measured_pkas(), Err(T3rError::NoPkaData)));
}

#[test]
fn measured_types_truncate_at_shorter_predicted_list() {
    // Two measured values but only one prediction: the second measurement
    // keeps no type and the formatted string has a single pair.
    let doc_text = PKA_TWO_VALUES.replace(
        r#"        <Pka>
          <PkaType><Value>Base</Value></PkaType>
          <PkaValue><Value>9.5</Value><Source>Prediction</Source></PkaValue>
        </Pka>
"#,
        "",
    );
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "lopsided.t3r", &doc_text);

    let doc = PkaResultFile::open(&path).unwrap();
    let measured = doc.measured_pkas().unwrap();
    assert_eq!(measured.len(), 2);
    assert_eq!(measured[0].pka_type, Some(PkaType::Acid));
    assert_eq!(measured[1].pka_type, None);
    assert_eq!(doc.formatted_pkas().unwrap(), "acid,2.86");
}

#[test]
fn logp_takes_the_larger_sweep_value() {
    let dir = tempdir().unwrap();
    let path = write_t3r(dir.path(), "logp.t3r", LOGP_OCTANOL);

    let doc = LogpResultFile::open(&path).unwrap();
    let result = doc.logp_measurement().unwrap();
    assert_eq!(result.value, 2.12231);
    assert_eq!(result.rmsd, 0.0516447);
    assert_eq!(result.solvent, "Octanol");
}

#[test]
fn sniff_identifies_category_without_full_parse() {
    let dir = tempdir().unwrap();
    let pka_path = write_t3r(dir.path(), "pka.t3r", PKA_FAST_UV);
    let logp_path = write_t3r(dir.path(), "logp.t3r", LOGP_OCTANOL);
    assert_eq!(AssayCategory::sniff(&pka_path).unwrap(), AssayCategory::Pka);
    assert_eq!(AssayCategory::sniff(&logp_path).unwrap(), AssayCategory::Logp);
}

#[test]
fn one_corrupted_file_does_not_abort_the_batch() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "a_first.t3r", PKA_FAST_UV);
    write_t3r(dir.path(), "b_corrupt.t3r", "this is not XML <<<");
    write_t3r(dir.path(), "c_last.t3r", PKA_DIELECTRIC);

    let extractor = BatchExtractor::new(dir.path()).unwrap();
    assert_eq!(extractor.num_files(), 3);

    let set = extractor.extract_pka();
    assert_eq!(set.num_succeeded(), 2);
    assert_eq!(set.num_failed(), 1);
    assert_eq!(set.failed[0].filename, "b_corrupt.t3r");
    assert!(!set.failed[0].reason.is_empty());

    // Row order follows sorted file order.
    assert_eq!(set.rows[0].filename, "a_first.t3r");
    assert_eq!(set.rows[1].filename, "c_last.t3r");
}

#[test]
fn a_batch_where_every_file_fails_still_returns() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "bad1.t3r", "garbage");
    write_t3r(dir.path(), "bad2.t3r", LOGP_OCTANOL); // wrong category

    let set = BatchExtractor::new(dir.path()).unwrap().extract_pka();
    assert_eq!(set.num_succeeded(), 0);
    assert_eq!(set.num_failed(), 2);
}

#[test]
fn multi_pka_document_yields_one_row_per_pka() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "two.t3r", PKA_TWO_VALUES);

    let set = BatchExtractor::new(dir.path()).unwrap().extract_pka();
    assert_eq!(set.rows.len(), 2);
    assert_eq!(set.rows[0].pka_number, 1);
    assert_eq!(set.rows[1].pka_number, 2);
    assert_eq!(set.rows[0].pka_value, 2.86);
    assert_eq!(set.rows[1].pka_value, 9.64);
    assert_eq!(set.rows[0].sample, set.rows[1].sample);
}

#[test]
fn empty_directory_is_a_hard_error() {
    let dir = tempdir().unwrap();
    let err = BatchExtractor::new(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        t3chomp::batch::BatchError::NoInputFiles(_)
    ));
}

#[test]
fn non_t3r_files_are_ignored_by_the_extension_filter() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "keep.t3r", PKA_FAST_UV);
    write_t3r(dir.path(), "notes.txt", "irrelevant");

    let extractor = BatchExtractor::new(dir.path()).unwrap();
    assert_eq!(extractor.num_files(), 1);
}

#[test]
fn logp_batch_yields_one_row_per_file() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "logp.t3r", LOGP_OCTANOL);

    let set = BatchExtractor::new(dir.path()).unwrap().extract_logp();
    assert_eq!(set.rows.len(), 1);
    assert_eq!(set.rows[0].logp, 2.12231);
    assert_eq!(set.rows[0].solvent, "Octanol");
    assert_eq!(set.rows[0].assay_quality, "Good");
}

#[test]
fn result_and_failed_csvs_are_written() {
    let dir = tempdir().unwrap();
    write_t3r(dir.path(), "good.t3r", PKA_FAST_UV);
    write_t3r(dir.path(), "bad.t3r", "garbage");

    let set = BatchExtractor::new(dir.path()).unwrap().extract_pka();
    let results_path = dir.path().join("results.csv");
    let failed_path = dir.path().join("failed_filenames.csv");
    set.write_results_csv(&results_path).unwrap();
    set.write_failed_csv(&failed_path).unwrap();

    let results = fs::read_to_string(&results_path).unwrap();
    let mut lines = results.lines();
    assert_eq!(
        lines.next().unwrap(),
        "sample,filename,assay_name,assay_quality,pka_number,pka_type,pka_value,\
         pka_std,pka_ionic_strength,pka_temperature,cosolvent,cosolvent_fractions"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("OCNT-0000018-AQ-001,good.t3r,Fast UV psKa,Good,1,base,8.11591"));

    let failed = fs::read_to_string(&failed_path).unwrap();
    assert_eq!(failed, "failed_filenames\nbad.t3r\n");
}
