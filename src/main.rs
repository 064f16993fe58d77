//! # gadget-report CLI
//!
//! Usage:
//!   gadget-report report.json --data data.json -o report.pdf
//!   echo '{ ... }' | gadget-report --data data.json
//!   gadget-report --example > report.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gadget_report::{generate_json, GenerateOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render form gadget reports to PDF")]
struct Args {
    /// Report metadata JSON. Read from stdin when omitted.
    metadata: Option<PathBuf>,

    /// Gadget data JSON the sections resolve paths against
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,

    /// How long to wait for each chunk of images, in milliseconds
    #[arg(long, default_value = "8000")]
    image_timeout_ms: u64,

    /// Fail on sections with an unknown content type
    #[arg(long)]
    strict: bool,

    /// Print a data: URL for preview instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// Print an example metadata document and exit
    #[arg(long)]
    example: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    if args.example {
        print!("{}", example_report_json());
        return Ok(());
    }

    let metadata = match &args.metadata {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let data = match &args.data {
        Some(path) => fs::read_to_string(path)?,
        None => "{}".to_string(),
    };

    let options = GenerateOptions {
        image_timeout: Duration::from_millis(args.image_timeout_ms),
        reject_unknown_content: args.strict,
        ..GenerateOptions::default()
    };

    let report = generate_json(&metadata, &data, &options).await?;

    if args.data_url {
        println!("{}", report.to_data_url());
    } else {
        fs::write(&args.output, &report.bytes)?;
        eprintln!(
            "✓ Written {} pages ({} bytes) to {}",
            report.page_count,
            report.bytes.len(),
            args.output.display()
        );
    }
    Ok(())
}

fn example_report_json() -> &'static str {
    r###"{
  "header": {
    "title": "Site Inspection",
    "subtitle": "North Harbour Estate",
    "companyName": "Acme Facilities",
    "address": "12 Harbour Road"
  },
  "pdfStyling": {
    "page": { "size": "A4", "orientation": "portrait" },
    "footer": { "leftText": "Confidential", "rightText": "Page {page} of {pages}" },
    "image": { "fit": "contain", "format": "jpeg", "quality": 0.85 }
  },
  "sections": [
    {
      "id": "details",
      "title": "Inspection details",
      "includeInPdf": true,
      "order": 1,
      "content": {
        "type": "formGrid",
        "rows": [
          [
            { "label": "Inspector", "value": "{{inspector.name}}", "span": 12 },
            { "label": "Date", "value": "{{date}}", "span": 12 }
          ],
          [
            { "label": "Site", "value": "{{site.name}}", "span": 16 },
            { "label": "Units", "value": "{{site.units}}", "span": 8 }
          ]
        ]
      }
    },
    {
      "id": "summary",
      "title": "Summary",
      "includeInPdf": true,
      "order": 2,
      "content": {
        "type": "text",
        "template": "Inspection of **{{site.name}}** by {{inspector.name}}.\n\n| Item | Status |\n|---|---|\n| Fire doors | OK |\n| Lighting | Replace 2 bulbs |"
      }
    },
    {
      "id": "findings",
      "title": "Findings",
      "includeInPdf": true,
      "order": 3,
      "content": {
        "type": "table",
        "columns": [
          { "header": "Area", "key": "area" },
          { "header": "Issue", "key": "issue" },
          { "header": "Severity", "key": "severity" }
        ],
        "dataPath": "findings"
      }
    },
    {
      "id": "notes",
      "title": "Notes",
      "includeInPdf": true,
      "order": 4,
      "content": {
        "type": "rawtext",
        "template": "## Follow-up\n- Replace bulbs in stairwell B\n- Re-test alarm → within 14 days"
      }
    },
    {
      "id": "photos",
      "title": "Photos",
      "includeInPdf": true,
      "order": 5,
      "content": { "type": "image", "dataPath": "photos" }
    }
  ]
}
"###
}

#[cfg(test)]
mod tests {
    use super::*;
    use gadget_report::ReportMetadata;

    #[test]
    fn example_metadata_parses_in_full() {
        let metadata: ReportMetadata =
            serde_json::from_str(example_report_json()).expect("example must be valid metadata");
        assert_eq!(metadata.sections.len(), 5);
        assert!(metadata.sections.iter().any(|s| s.id == "notes"));
    }

    #[test]
    fn example_header_has_no_placeholders() {
        let metadata: ReportMetadata = serde_json::from_str(example_report_json()).unwrap();
        let header = metadata.header.expect("example has a header");
        for field in [&header.title, &header.subtitle, &header.company_name, &header.address] {
            assert!(!field.as_deref().unwrap_or("").contains("{{"));
        }
    }
}
