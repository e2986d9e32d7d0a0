use crate::prelude::MetricKey;

/// Display text for a metric cell; undefined values render as `n/a`.
pub fn format_metric(key: MetricKey, value: Option<f64>) -> String {
    let Some(value) = value else {
        return "n/a".to_string();
    };
    match key {
        MetricKey::Mae | MetricKey::Rmse => format!("{value:.2}"),
        MetricKey::Mape => format!("{value:.2}%"),
        MetricKey::R2 => format!("{value:.3}"),
        MetricKey::DirectionalAccuracy => format!("{:.1}%", value * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_metric_scale() {
        assert_eq!(format_metric(MetricKey::Mae, Some(1.4166)), "1.42");
        assert_eq!(format_metric(MetricKey::Mape, Some(0.8412)), "0.84%");
        assert_eq!(format_metric(MetricKey::R2, Some(0.98749)), "0.987");
        assert_eq!(format_metric(MetricKey::DirectionalAccuracy, Some(0.6552)), "65.5%");
        assert_eq!(format_metric(MetricKey::R2, None), "n/a");
    }
}
