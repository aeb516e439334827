//! Renders estimates as a text table, JSON or CSV.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use estimator_core::{EstimateReport, MaterialEstimate, WallEstimate};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    category: &'a str,
    material: &'a str,
    quantity: f64,
    unit: &'a str,
}

pub fn write_report<W: Write>(out: &mut W, report: &EstimateReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "Rooms found: {}", report.rooms.len())?;
            for room in &report.rooms {
                writeln!(out, "  room {}: {:.2}", room.id, room.area)?;
            }
            write_materials_table(out, &report.materials)?;
            for warning in report.diagnostics.warnings() {
                writeln!(out, "Warning: {}", warning)?;
            }
        }
        OutputFormat::Json => write_json(out, report)?,
        OutputFormat::Csv => {
            for warning in report.diagnostics.warnings() {
                warn!("{}", warning);
            }
            write_materials_csv(out, &report.materials)?;
        }
    }
    Ok(())
}

pub fn write_materials<W: Write>(out: &mut W, estimate: &MaterialEstimate, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_materials_table(out, estimate),
        OutputFormat::Json => write_json(out, estimate),
        OutputFormat::Csv => write_materials_csv(out, estimate),
    }
}

pub fn write_wall<W: Write>(out: &mut W, estimate: &WallEstimate, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "Wall length: {:.2}", estimate.wall_length)?;
            writeln!(out, "Wall area: {:.2}", estimate.wall_area)?;
            writeln!(out, "  Bricks: {:.0}", estimate.bricks)?;
            writeln!(out, "  Cement: {:.2} bags", estimate.cement_bags)?;
            writeln!(out, "  Sand: {:.2}", estimate.sand_volume)?;
        }
        OutputFormat::Json => write_json(out, estimate)?,
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["wall_length", "wall_area", "bricks", "cement_bags", "sand_volume"])?;
            writer.write_record([
                estimate.wall_length.to_string(),
                estimate.wall_area.to_string(),
                estimate.bricks.round().to_string(),
                estimate.cement_bags.to_string(),
                estimate.sand_volume.to_string(),
            ])?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn write_materials_table<W: Write>(out: &mut W, estimate: &MaterialEstimate) -> Result<()> {
    writeln!(out, "Total area: {:.2}", estimate.area)?;
    for (category, quantities) in estimate.by_category() {
        writeln!(out, "{}", category)?;
        for quantity in quantities {
            writeln!(out, "  {}: {}", quantity.name, quantity.formatted())?;
        }
    }
    Ok(())
}

fn write_materials_csv<W: Write>(out: &mut W, estimate: &MaterialEstimate) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for quantity in &estimate.quantities {
        writer.serialize(CsvRow {
            category: &quantity.category,
            material: &quantity.name,
            quantity: quantity.display_value(),
            unit: &quantity.unit,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
