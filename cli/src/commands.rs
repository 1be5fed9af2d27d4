//! Subcommand handlers

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use log::{info, warn};

use labreport_client::{export, fetch_into_catalog, Component, Credential, CredentialStore, MaterialRecord, RemoteFetcher};
use labreport_core::database::validate_database_path;
use labreport_core::extractor::{detail_views, summary_tables};
use labreport_core::filter::DATE_FORMAT;
use labreport_core::pipeline::visualize;
use labreport_core::{DatabaseCatalog, LabConfig, LineNumber, RowFilter, TestDatabase, TestRecord, TestType, Visualization};
use labreport_pdf::{export_png, ReportAssembler, ReportRequest};

use crate::display::{render_grid, render_table};
use crate::TestArgs;

/// List databases and the role of each table
pub fn tables(config: &LabConfig, dbs: &[PathBuf]) -> Result<()> {
    let mut catalog = DatabaseCatalog::new();
    if dbs.is_empty() {
        let dir = &config.client.databases_dir;
        catalog
            .add_dir(dir)
            .with_context(|| format!("failed to list databases in {}", dir.display()))?;
    }
    for db in dbs {
        catalog.add(db).with_context(|| format!("cannot add {}", db.display()))?;
    }

    for path in catalog.entries() {
        let db = TestDatabase::open(path)?;
        let test_type = TestType::from_path(path)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| "?".to_string());
        println!("{} [{}]", path.display(), test_type);
        for (name, role) in db.classified_tables()? {
            println!("  {:<24} {}", name, role);
        }
    }
    Ok(())
}

/// Print the summary tables of a database, optionally filtered
pub fn browse(db_path: &Path, id: Option<&str>, date: Option<&str>) -> Result<()> {
    let mut filter = RowFilter::new();
    if let Some(id) = id {
        filter = filter.with_test_id(id);
    }
    if let Some(date) = date {
        let day = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .with_context(|| format!("invalid date {:?}, expected yyyy-mm-dd", date))?;
        filter = filter.with_date(day);
    }

    let db = TestDatabase::open(db_path)?;
    let tables = summary_tables(&db)?;
    if tables.is_empty() {
        warn!("No summary tables in {}", db_path.display());
    }
    for table in tables {
        println!("{}", render_table(&filter.apply(&table)));
    }
    Ok(())
}

/// Print the detail rows of one test
pub fn details(config: &LabConfig, test: &TestArgs) -> Result<()> {
    let record = test_record(config, test)?;
    let db = TestDatabase::open(&test.db)?;

    let views = detail_views(&db, &record)?;
    if views.is_empty() {
        bail!("no detail tables in {}", test.db.display());
    }
    for view in views {
        println!("{}", view.title);
        println!("{}", render_table(&view.table));
    }
    Ok(())
}

/// Build the PDF report of one test and return its path
pub fn report(config: &LabConfig, test: &TestArgs, output: Option<&str>) -> Result<PathBuf> {
    validate_database_path(&test.db)?;
    let db = test.db.to_string_lossy();
    let test_type = match &test.test_type {
        Some(t) => t.clone(),
        None => TestType::from_path(&test.db)?.to_string(),
    };

    let request = ReportRequest::from_raw(
        &db,
        &test_type,
        &test.id,
        test.line,
        output,
        config.matching.fuzzy_threshold,
    )?;

    let assembler = ReportAssembler::new(config.report.clone());
    let path = assembler
        .create_report(&request)
        .with_context(|| format!("failed to build report for test {}", test.id))?;
    Ok(path)
}

/// Export the viewer charts of one test as PNG files, or print its table
pub fn plot(config: &LabConfig, test: &TestArgs, out_dir: &Path) -> Result<()> {
    let record = test_record(config, test)?;
    let db = TestDatabase::open(&test.db)?;
    let visualization = visualize(&db, &record, config.visualization.smoothing())?;

    match visualization {
        Visualization::NoData(reason) => println!("No valid data to plot: {}", reason),
        Visualization::Table(table) => println!("{}", render_grid(&table.full_headers(), &table.full_rows())),
        Visualization::Plots(groups) => {
            fs::create_dir_all(out_dir)?;
            let width = config.visualization.plot_width;
            let height = config.visualization.plot_height;
            for (i, group) in groups.iter().enumerate() {
                let path = out_dir.join(format!("{}_{}_{}.png", record.test_type, record.test_id, i + 1));
                if export_png(group, width, height, &path)? {
                    println!("{} -> {}", group.title, path.display());
                } else {
                    println!("{}: No valid data to plot", group.title);
                }
            }
        }
    }
    Ok(())
}

/// Fetch a remote database into the local databases directory
pub fn fetch(
    config: &LabConfig,
    remote: &str,
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
    saved: Option<usize>,
    save: bool,
) -> Result<()> {
    let store = CredentialStore::new(&config.client.credentials_file);

    let credential = match (saved, host) {
        (Some(index), _) => store
            .get(index)?
            .ok_or_else(|| anyhow!("no saved credential at index {}", index))?,
        (None, Some(host)) => {
            let user = user.ok_or_else(|| anyhow!("--user is required with --host"))?;
            let credential = Credential::new(host, user, password.unwrap_or_default());
            if save {
                store.append(&credential)?;
                info!("Saved credential for {}", credential.host);
            }
            credential
        }
        (None, None) => {
            let hosts = store.hosts()?;
            if hosts.is_empty() {
                bail!("give --host and --user, or save a credential first");
            }
            for (i, host) in hosts.iter().enumerate() {
                println!("[{}] {}", i, host);
            }
            bail!("pick a saved credential with --saved <index>");
        }
    };

    let fetcher = remote_fetcher()?;
    let (path, catalog) = fetch_and_list(&*fetcher, &credential, remote, &config.client.databases_dir)?;
    println!("Fetched {}", path.display());
    for entry in catalog.entries() {
        println!("  {}", entry.display());
    }
    Ok(())
}

/// Fetch `remote` into `databases_dir` and return it with the catalog of
/// every database now in that directory
fn fetch_and_list(
    fetcher: &dyn RemoteFetcher,
    credential: &Credential,
    remote: &str,
    databases_dir: &Path,
) -> Result<(PathBuf, DatabaseCatalog)> {
    let mut catalog = DatabaseCatalog::new();
    if databases_dir.is_dir() {
        catalog.add_dir(databases_dir)?;
    }
    let path = fetch_into_catalog(fetcher, credential, remote, databases_dir, &mut catalog)?;
    Ok((path, catalog))
}

#[cfg(feature = "sftp")]
fn remote_fetcher() -> Result<Box<dyn RemoteFetcher>> {
    Ok(Box::new(labreport_client::SftpFetcher::new()))
}

#[cfg(not(feature = "sftp"))]
fn remote_fetcher() -> Result<Box<dyn RemoteFetcher>> {
    bail!("remote fetch needs the `sftp` feature")
}

/// Export a raw material summary
pub fn material(raw: &str, components: &[String], date: &str, txt: Option<&Path>, qr: Option<&Path>) -> Result<()> {
    let components = components
        .iter()
        .map(|c| Component::parse(c).ok_or_else(|| anyhow!("invalid component {:?}, expected name:percent:supplier", c)))
        .collect::<Result<Vec<_>>>()?;
    let record = MaterialRecord::new(raw, components, date);

    if txt.is_none() && qr.is_none() {
        println!("{}", record.summary());
    }
    if let Some(path) = txt {
        export::save_material_text(&record, path)?;
    }
    if let Some(path) = qr {
        export::save_material_qr(&record, path)?;
    }
    Ok(())
}

fn test_record(config: &LabConfig, test: &TestArgs) -> Result<TestRecord> {
    validate_database_path(&test.db)?;
    let test_type = match &test.test_type {
        Some(t) => TestType::parse_fuzzy(t, config.matching.fuzzy_threshold)?,
        None => TestType::from_path(&test.db)
            .with_context(|| format!("cannot infer the test type of {}, pass --type", test.db.display()))?,
    };
    let test_id = test
        .id
        .trim()
        .parse::<i64>()
        .with_context(|| format!("test id {:?} is not an integer", test.id))?;
    let line = test.line.map(LineNumber::new).transpose()?;
    Ok(TestRecord::new(test_type, test_id, line)?)
}
