//! This example shows how to render spatial values into files of every supported format.
//!
//! Run this example with one argument - path to a text file with one spatial value per line, optionally followed
//! by a tab and a label. Values are either bare WKT or `'WKT',SRID`. Running it will create files
//! `output.svg`, `output.png`, `output.pdf` and `output.js` in the current directory.
//!
//! ```shell
//! cargo run --example render_to_file -- ./values.txt
//! ```

use anyhow::{anyhow, Result};
use sqlgis::{Visualization, VisualizationSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(file_name) = std::env::args().nth(1) else {
        return Err(anyhow!(
            "This example must be run with one argument - name of the file with spatial values"
        ));
    };
    let text = std::fs::read_to_string(file_name)?;

    let rows = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_once('\t').unwrap_or((line, "")));

    let visualization = Visualization::new(rows, VisualizationSettings::default());
    log::info!("Loaded {} rows", visualization.rows().len());

    std::fs::write("output.svg", visualization.to_svg())?;
    visualization.to_canvas()?.save_png("output.png")?;
    visualization.to_pdf_document("Spatial values").save("output.pdf")?;
    std::fs::write("output.js", visualization.to_ol())?;

    log::info!("Files written");

    Ok(())
}
