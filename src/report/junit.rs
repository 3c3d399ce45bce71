use super::types::TestResults;
use crate::error::HarnessError;
use crate::runner::state::{stage_summaries, TestResult};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML, one `<testsuite>` per stage
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_time: f64 = results.results.iter().map(|r| r.duration).sum();

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "lostfound-tester-run"));
    suites_start.push_attribute(("tests", results.summary.total.to_string().as_str()));
    suites_start.push_attribute(("failures", results.summary.failed.to_string().as_str()));
    suites_start.push_attribute(("time", format!("{:.3}", total_time).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    for (idx, stage) in stage_summaries(&results.results).iter().enumerate() {
        let cases: Vec<&TestResult> = results
            .results
            .iter()
            .filter(|r| r.stage == stage.stage)
            .collect();
        let time: f64 = cases.iter().map(|r| r.duration).sum();

        let mut suite_start = BytesStart::new("testsuite");
        suite_start.push_attribute(("name", stage.stage.as_str()));
        suite_start.push_attribute(("id", idx.to_string().as_str()));
        suite_start.push_attribute(("tests", stage.total.to_string().as_str()));
        suite_start.push_attribute(("failures", stage.failed.to_string().as_str()));
        suite_start.push_attribute(("time", format!("{:.3}", time).as_str()));
        suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
        writer.write_event(Event::Start(suite_start))?;

        for case in cases {
            write_test_case(&mut writer, case)?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, result: &TestResult) -> Result<()> {
    let classname = format!("lostfound.{}", classname_of(&result.stage));

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", format!("{:.3}", result.duration).as_str()));
    writer.write_event(Event::Start(case_start))?;

    if !result.status.is_pass() {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", result.message.as_str()));
        fail_start.push_attribute(("type", "AssertionError"));
        writer.write_event(Event::Start(fail_start))?;
        writer.write_event(Event::Text(BytesText::new(&result.message)))?;
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// "Search & Statistics" -> "search_statistics"
fn classname_of(stage: &str) -> String {
    stage
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Write `junit.xml` into `output_dir`
pub fn write_report(results: &TestResults, output_dir: &Path) -> crate::error::Result<()> {
    let xml = generate_junit_xml(results).map_err(|e| HarnessError::Report(e.to_string()))?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
