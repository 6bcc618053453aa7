use anyhow::Result;
use plotters::prelude::*;

use crate::harness::RetrievalMetrics;

pub fn generate_plots(methods: &[RetrievalMetrics], output_dir: &str) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    plot_precision_comparison(methods, &format!("{}/precision_comparison.png", output_dir))?;
    plot_metric_profile(methods, &format!("{}/metric_profile.png", output_dir))?;
    Ok(())
}

fn plot_precision_comparison(methods: &[RetrievalMetrics], path: &str) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Precision@5 by Method", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..methods.len() as f64, 0f64..1.0f64)?;

    chart.configure_mesh().y_desc("Precision@5").draw()?;

    for (i, method) in methods.iter().enumerate() {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(i as f64 + 0.2, 0.0), (i as f64 + 0.8, method.precision_at_k)],
                BLUE.filled(),
            )))?
            .label(method.method.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    println!("Saved precision plot to {}", path);
    Ok(())
}

fn plot_metric_profile(methods: &[RetrievalMetrics], path: &str) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Retrieval Metric Profile", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..4f64, 0f64..1.0f64)?;

    chart.configure_mesh().y_desc("Score").x_labels(4).draw()?;

    let palette = [RED, BLUE, GREEN, MAGENTA, CYAN];
    for (method_idx, method) in methods.iter().enumerate() {
        let color = palette[method_idx % palette.len()];
        let points = [
            (0.5, method.precision_at_k),
            (1.5, method.recall_at_k),
            (2.5, method.ndcg_at_k),
            (3.5, method.mrr),
        ];
        for (x, y) in points {
            chart.draw_series(std::iter::once(Circle::new((x, y), 5, color.filled())))?;
        }
    }

    root.present()?;
    println!("Saved metric profile plot to {}", path);
    Ok(())
}
