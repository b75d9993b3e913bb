use crate::numerical::plot_data::PlotBundle;
use csv::Writer;
use std::fs::File;
use std::io;
use std::path::Path;

/// Column titles for the bundle: x, f(x), then f^(n)(x) and F(x) when present.
pub fn plot_bundle_headers(bundle: &PlotBundle) -> Vec<String> {
    let mut headers = vec!["x".to_string(), "f(x)".to_string()];
    if bundle.derivative.is_some() {
        headers.push(format!("f^({})(x)", bundle.derivative_order));
    }
    if bundle.integral.is_some() {
        headers.push("F(x)".to_string());
    }
    headers
}

/// Writes the sampled curves of `bundle` as CSV, one row per grid point. Undefined samples are
/// written as `NaN`.
pub fn save_plot_bundle_to_csv(bundle: &PlotBundle, filename: &Path) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(&plot_bundle_headers(bundle))?;

    let optional_columns: Vec<_> = [&bundle.derivative, &bundle.integral]
        .into_iter()
        .flatten()
        .collect();
    for (i, (x, y)) in bundle.function.points().enumerate() {
        let mut row_data = vec![x.to_string(), y.to_string()];
        row_data.extend(optional_columns.iter().map(|set| set.y[i].to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}
