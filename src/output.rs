use std::path::Path;

use anyhow::{Context, Result};
use plotters::element::Pie;
use plotters::prelude::*;

use crate::types::Holder;

/// "0x1234...abcd" style label used on chart axes and pie slices.
pub fn abbreviate(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

pub fn write_holders_csv(path: &Path, holders: &[Holder]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for h in holders {
        wtr.serialize(h)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn bar_chart(path: &Path, top: &[Holder], symbol: &str) -> Result<()> {
    if top.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let max = top
        .iter()
        .map(|h| h.balance)
        .fold(f64::MIN_POSITIVE, f64::max);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} {} Holders (by balance)", top.len(), symbol),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d((0..top.len()).into_segmented(), 0.0..max * 1.05)?;
    chart
        .configure_mesh()
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) if *i < top.len() => abbreviate(&top[*i].address),
            _ => String::new(),
        })
        .x_labels(top.len())
        .y_desc(format!("Balance ({symbol})"))
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .data(top.iter().enumerate().map(|(i, h)| (i, h.balance))),
    )?;
    root.present()?;
    Ok(())
}

pub fn pie_chart(path: &Path, top: &[Holder], symbol: &str) -> Result<()> {
    if top.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Top {} {} Holders Share", top.len(), symbol),
        ("sans-serif", 24),
    )?;
    let sizes: Vec<f64> = top.iter().map(|h| h.balance.max(0.0)).collect();
    let labels: Vec<String> = top.iter().map(|h| abbreviate(&h.address)).collect();
    let colors: Vec<RGBColor> = (0..top.len())
        .map(|i| {
            let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
            RGBColor(r, g, b)
        })
        .collect();
    let center = (400, 420);
    let radius = 300.0;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 14).into_font());
    root.draw(&pie)?;
    root.present()?;
    Ok(())
}
