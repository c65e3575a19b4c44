//! Lifecycle of one mounted map: created, waiting for its style, ready to
//! take data, and finally torn down.

use crate::data::Datasets;
use crate::engine::{
    Control, ControlPosition, EngineEvent, GeolocateOptions, Layer, MapEngine, MapOptions,
};
use crate::error::{LayerError, SessionError};
use crate::layers::base::{building_extrusion, gradient_sky};
use crate::layers::{dispatch_hover, mount_data_layers};
use crate::tooltip::TooltipSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// Engine created, style not loaded yet
    Loading,
    Ready,
    /// Re-mounting data layers
    Updating,
    Removed,
}

/// Geolocation control as installed on style load
const GEOLOCATE: GeolocateOptions = GeolocateOptions {
    enable_high_accuracy: true,
    track_user_location: true,
    show_user_heading: true,
};

type MountFn<E> = fn(&mut E, Option<&Datasets>) -> Result<bool, LayerError>;

/// Owns the engine and the datasets currently shown on it
pub struct MapSession<E: MapEngine> {
    engine: Option<E>,
    state: SessionState,
    data: Option<Datasets>,
    mount: MountFn<E>,
}

impl<E: MapEngine> Default for MapSession<E> {
    fn default() -> Self {
        Self {
            engine: None,
            state: SessionState::Uninitialized,
            data: None,
            mount: mount_data_layers::<E>,
        }
    }
}

impl<E: MapEngine> MapSession<E> {
    /// Create the engine and its navigation control. Base and data layers
    /// follow once the engine reports its style loaded (see [`Self::pump`]).
    pub fn init(options: MapOptions, data: Option<Datasets>) -> Self {
        let mut engine = E::create(options);
        engine.add_control(Control::Navigation, ControlPosition::TopLeft);
        tracing::info!(has_data = data.is_some(), "map session loading");

        Self {
            engine: Some(engine),
            state: SessionState::Loading,
            data,
            mount: mount_data_layers::<E>,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub fn data(&self) -> Option<&Datasets> {
        self.data.as_ref()
    }

    /// Drain pending engine events. Returns true when the session became
    /// ready during this call.
    ///
    /// The base layers are in place and the session is ready even if the
    /// data layers then fail to mount; a later [`Self::update`] retries them.
    pub fn pump(&mut self) -> Result<bool, LayerError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(false);
        };

        let mut became_ready = false;
        while let Some(event) = engine.poll_event() {
            match event {
                EngineEvent::StyleLoaded if self.state == SessionState::Loading => {
                    engine.add_layer(Layer::Style(building_extrusion()));
                    engine.add_layer(Layer::Style(gradient_sky()));
                    engine.add_control(Control::Geolocate(GEOLOCATE), ControlPosition::TopRight);

                    self.state = SessionState::Ready;
                    became_ready = true;

                    let mounted = (self.mount)(engine, self.data.as_ref()).inspect_err(|err| {
                        tracing::error!(error = %err, "data layers failed to mount");
                    })?;
                    tracing::info!(data_layers = mounted, "map session ready");
                }
                EngineEvent::StyleLoaded => {
                    tracing::debug!(state = ?self.state, "ignoring repeated style load");
                }
            }
        }
        Ok(became_ready)
    }

    /// Swap in new datasets. When ready they are re-mounted at once,
    /// replacing the current layers by id; while loading they wait for the
    /// style.
    pub fn update(&mut self, data: Datasets) -> Result<(), UpdateError> {
        if self.state == SessionState::Removed {
            return Err(SessionError::Removed.into());
        }
        self.data = Some(data);

        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        if self.state != SessionState::Ready {
            tracing::debug!(state = ?self.state, "deferring data until ready");
            return Ok(());
        }

        self.state = SessionState::Updating;
        let result = (self.mount)(engine, self.data.as_ref());
        self.state = SessionState::Ready;
        result?;

        tracing::info!("map data updated");
        Ok(())
    }

    /// Route a pointer move to the hover path
    pub fn pointer_moved(
        &mut self,
        position: (u16, u16),
        sink: &mut dyn TooltipSink,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Removed {
            return Err(SessionError::Removed);
        }
        if let Some(engine) = self.engine.as_mut() {
            dispatch_hover(engine, position, sink);
        }
        Ok(())
    }

    /// Tear down the engine. Removing twice is a no-op.
    pub fn remove(&mut self) {
        if self.state == SessionState::Removed {
            return;
        }
        if let Some(mut engine) = self.engine.take() {
            engine.remove();
        }
        self.data = None;
        self.state = SessionState::Removed;
        tracing::info!("map session removed");
    }
}

/// Why an update was not applied
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UpdateError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}
