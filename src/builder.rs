//! Panel sizing: measure each surface, lock its height to the panel's aspect
//! ratio, and emit the finalized panel list for the rendering module.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{validate_aspect_ratio, ColorDefaults, PageConfig, PanelSpec};
use crate::surface::SurfaceLookup;
use crate::Result;

/// A sized panel, ready for the rendering module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    pub id: String,
    pub primary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    pub width: f64,
    pub height: f64,
}

/// Round to one decimal place the way `Number.prototype.toFixed(1)` does.
/// Applied to both the emitted config and the height written to the surface
/// so the two always agree.
///
/// The nearest tenth is picked from the exact binary value, so `0.35` (stored
/// as 0.34999...) rounds down. An exact midpoint is only possible for odd
/// multiples of a quarter, and those round away from zero.
pub fn round_tenth(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return (value * 10.0).round() / 10.0;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn measured_width(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Derives [`PanelConfig`]s from panel specs and a surface lookup.
#[derive(Debug, Clone, Copy)]
pub struct PanelConfigBuilder<'a> {
    specs: &'a [PanelSpec],
    defaults: &'a ColorDefaults,
}

impl<'a> PanelConfigBuilder<'a> {
    pub fn new(config: &'a PageConfig) -> Self {
        Self {
            specs: &config.panels,
            defaults: &config.defaults,
        }
    }

    pub fn from_specs(specs: &'a [PanelSpec], defaults: &'a ColorDefaults) -> Self {
        Self { specs, defaults }
    }

    /// Size every panel whose surface resolves, in input order.
    ///
    /// Aspect ratios of all specs, and colors of the specs that resolve, are
    /// checked before any surface is touched, so a configuration error leaves
    /// every surface unmodified. Specs whose id does not resolve are skipped
    /// without side effects and without looking at their colors.
    pub fn build(&self, lookup: &mut dyn SurfaceLookup) -> Result<Vec<PanelConfig>> {
        for spec in self.specs {
            validate_aspect_ratio(&spec.id, spec.aspect_ratio)?;
        }

        let mut resolved = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            if lookup.resolve(&spec.id).is_none() {
                debug!("no surface for panel '{}', skipping", spec.id);
                continue;
            }
            resolved.push((spec, spec.resolve_colors(self.defaults)?));
        }

        let mut panels = Vec::with_capacity(resolved.len());
        for (spec, (primary_color, secondary_color)) in resolved {
            let Some(surface) = lookup.resolve(&spec.id) else {
                continue;
            };

            let width = round_tenth(measured_width(surface.width()));
            let height = round_tenth(width / spec.aspect_ratio);
            surface.set_height(height);
            debug!("panel '{}': {} x {}", spec.id, width, height);

            panels.push(PanelConfig {
                id: spec.id.clone(),
                primary_color,
                secondary_color,
                width,
                height,
            });
        }
        Ok(panels)
    }
}

/// Convenience wrapper around [`PanelConfigBuilder::build`].
pub fn build_panels(
    specs: &[PanelSpec],
    defaults: &ColorDefaults,
    lookup: &mut dyn SurfaceLookup,
) -> Result<Vec<PanelConfig>> {
    PanelConfigBuilder::from_specs(specs, defaults).build(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurfaces;
    use crate::Error;

    #[test]
    fn wave_panel_at_600_is_200_high() {
        let specs = vec![PanelSpec::new("wave", 3.0, "#759203")];
        let mut surfaces = MemorySurfaces::new().with_surface("wave", 600.0);

        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert_eq!(
            panels,
            vec![PanelConfig {
                id: "wave".into(),
                primary_color: "#759203".into(),
                secondary_color: None,
                width: 600.0,
                height: 200.0,
            }]
        );
        assert_eq!(surfaces.get("wave").unwrap().height, Some(200.0));
    }

    #[test]
    fn missing_surface_yields_nothing() {
        let specs = vec![PanelSpec::new("missing", 2.0, "#000")];
        let mut surfaces = MemorySurfaces::new().with_surface("wave", 600.0);
        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert!(panels.is_empty());
        assert_eq!(surfaces.total_writes(), 0);
    }

    #[test]
    fn uncolored_missing_panel_is_skipped() {
        let specs = vec![PanelSpec::uncolored("missing", 2.0)];
        let mut surfaces = MemorySurfaces::new();
        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert!(panels.is_empty());
    }

    #[test]
    fn uncolored_resolved_panel_fails_before_any_write() {
        let specs = vec![
            PanelSpec::new("wave", 3.0, "#759203"),
            PanelSpec::uncolored("control", 15.0),
        ];
        let mut surfaces = MemorySurfaces::new()
            .with_surface("wave", 600.0)
            .with_surface("control", 900.0);
        let err = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ref m) if m.contains("control")));
        assert_eq!(surfaces.total_writes(), 0);
    }

    #[test]
    fn zero_width_gives_zero_height() {
        let specs = vec![PanelSpec::new("wave", 3.0, "#759203")];
        let mut surfaces = MemorySurfaces::new().with_surface("wave", 0.0);
        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert_eq!(panels[0].width, 0.0);
        assert_eq!(panels[0].height, 0.0);
        assert_eq!(surfaces.get("wave").unwrap().height, Some(0.0));
    }

    #[test]
    fn bogus_widths_measure_as_zero() {
        let specs = vec![
            PanelSpec::new("nan", 2.0, "#000"),
            PanelSpec::new("neg", 2.0, "#000"),
        ];
        let mut surfaces = MemorySurfaces::new()
            .with_surface("nan", f64::NAN)
            .with_surface("neg", -40.0);
        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert!(panels.iter().all(|p| p.width == 0.0 && p.height == 0.0));
    }

    #[test]
    fn rounding_is_shared_with_surface() {
        let specs = vec![PanelSpec::new("control", 15.0, "#c0e822")];
        let mut surfaces = MemorySurfaces::new().with_surface("control", 1001.37);
        let panels = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap();
        assert_eq!(panels[0].width, 1001.4);
        assert_eq!(panels[0].height, 66.8);
        assert_eq!(surfaces.get("control").unwrap().height, Some(panels[0].height));
    }

    #[test]
    fn invalid_ratio_fails_before_any_write() {
        let specs = vec![
            PanelSpec::new("wave", 3.0, "#759203"),
            PanelSpec::new("broken", 0.0, "#000"),
        ];
        let mut surfaces = MemorySurfaces::new()
            .with_surface("wave", 600.0)
            .with_surface("broken", 300.0);
        let err = build_panels(&specs, &ColorDefaults::default(), &mut surfaces).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ref m) if m.contains("broken")));
        assert_eq!(surfaces.total_writes(), 0);
    }

    #[test]
    fn round_tenth_matches_one_decimal() {
        assert_eq!(round_tenth(66.666), 66.7);
        assert_eq!(round_tenth(200.0), 200.0);
        assert_eq!(round_tenth(0.04), 0.0);
    }

    #[test]
    fn round_tenth_follows_exact_binary_value() {
        assert_eq!(round_tenth(0.35), 0.3);
        assert_eq!(round_tenth(1.45), 1.4);
        assert_eq!(round_tenth(0.25), 0.3);
        assert_eq!(round_tenth(2.75), 2.8);
        assert_eq!(round_tenth(84.26666), 84.3);
    }
}
