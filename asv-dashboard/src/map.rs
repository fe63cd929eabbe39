//! Map overlay: waypoint markers and the route polyline
//!
//! The overlay owns every layer it has drawn and removes all of them before
//! drawing a new track, so showing the same track twice leaves the same
//! number of layers on the canvas.

use asv_core::model::{Bounds, LatLon, Track};
use std::collections::BTreeMap;
use tracing::debug;

/// Handle to a layer drawn on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLon,
    pub glyph: &'static str,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f32,
    pub dash_array: &'static str,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: "#0071e3",
            weight: 3,
            opacity: 0.7,
            dash_array: "10, 5",
        }
    }
}

/// Render target for map layers
pub trait MapCanvas {
    fn add_marker(&mut self, marker: MarkerSpec) -> LayerId;
    fn add_polyline(&mut self, path: Vec<LatLon>, style: PolylineStyle) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
    fn fit_bounds(&mut self, bounds: Bounds);
}

#[derive(Debug)]
pub struct MapOverlay<C> {
    canvas: C,
    markers: Vec<LayerId>,
    route_line: Option<LayerId>,
}

impl<C: MapCanvas> MapOverlay<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            markers: Vec::new(),
            route_line: None,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_route_line(&self) -> bool {
        self.route_line.is_some()
    }

    /// Remove every layer this overlay drew
    pub fn clear(&mut self) {
        for id in self.markers.drain(..) {
            self.canvas.remove_layer(id);
        }
        if let Some(id) = self.route_line.take() {
            self.canvas.remove_layer(id);
        }
    }

    /// Replace the drawn track. An empty track only clears the map.
    pub fn show(&mut self, track: &Track) {
        self.clear();

        for waypoint in &track.waypoints {
            let id = self.canvas.add_marker(MarkerSpec {
                position: waypoint.position(),
                glyph: waypoint.kind().glyph(),
                popup: waypoint.popup_text(),
            });
            self.markers.push(id);
        }

        let Some(bounds) = track.bounds() else {
            debug!(track = %track.id, "empty track, viewport unchanged");
            return;
        };
        self.route_line = Some(self.canvas.add_polyline(track.path(), PolylineStyle::default()));
        self.canvas.fit_bounds(bounds);
        debug!(track = %track.id, markers = self.markers.len(), "track drawn");
    }
}

/// A drawn layer kept by `MapScene`
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker(MarkerSpec),
    Polyline { path: Vec<LatLon>, style: PolylineStyle },
}

/// In-memory canvas used by the headless binary and tests
#[derive(Debug, Default)]
pub struct MapScene {
    next_id: u64,
    layers: BTreeMap<LayerId, Layer>,
    viewport: Option<Bounds>,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Marker(marker) => Some(marker),
            Layer::Polyline { .. } => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[LatLon]> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Polyline { path, .. } => Some(path.as_slice()),
            Layer::Marker(_) => None,
        })
    }

    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, layer);
        id
    }
}

impl MapCanvas for MapScene {
    fn add_marker(&mut self, marker: MarkerSpec) -> LayerId {
        self.insert(Layer::Marker(marker))
    }

    fn add_polyline(&mut self, path: Vec<LatLon>, style: PolylineStyle) -> LayerId {
        self.insert(Layer::Polyline { path, style })
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Some(bounds);
    }
}
