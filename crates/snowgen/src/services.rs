use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::{
    config::Configuration,
    decoder::Decoder,
    error::{Error, Result},
    generator::Generator,
};

/// One shared configuration, generator, and decoder for an application.
///
/// Intended to be built once at startup and cloned into whatever needs ids
/// (request handlers, workers, ...). Every clone points at the same
/// [`Generator`], so ids stay unique across the whole process.
///
/// # Example
/// ```
/// use snowgen::{Configuration, IdServices};
///
/// let services = IdServices::builder()
///     .config(Configuration::default())
///     .configure(|config| config.worker_id = 12)
///     .build()
///     .unwrap();
///
/// let id = services.generator().next_id().unwrap();
/// assert_eq!(services.decoder().worker_id(id), 12);
/// ```
#[derive(Clone, Debug)]
pub struct IdServices {
    config: Arc<Configuration>,
    generator: Arc<Generator>,
    decoder: Decoder,
}

impl IdServices {
    /// Starts a builder with no configuration.
    pub fn builder() -> IdServicesBuilder {
        IdServicesBuilder::default()
    }

    /// The configuration both services were built from.
    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    /// The shared generator.
    pub fn generator(&self) -> &Arc<Generator> {
        &self.generator
    }

    /// The decoder matching [`IdServices::generator`].
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}

type Configure = Box<dyn FnOnce(&mut Configuration) + Send>;

/// Builder for [`IdServices`].
#[derive(Default)]
pub struct IdServicesBuilder {
    config: Option<Configuration>,
    configure: Vec<Configure>,
}

impl IdServicesBuilder {
    /// Sets the base configuration.
    #[must_use]
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Registers a callback adjusting the configuration before it is
    /// validated. Callbacks run in registration order.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut Configuration) + Send + 'static) -> Self {
        self.configure.push(Box::new(f));
        self
    }

    /// Applies the callbacks, validates, and builds the shared services.
    ///
    /// # Errors
    /// - [`Error::NullConfiguration`] if no configuration was set
    /// - any error of [`Configuration::validate`]
    pub fn build(self) -> Result<IdServices> {
        let mut config = self.config.ok_or(Error::NullConfiguration)?;
        for f in self.configure {
            f(&mut config);
        }

        let generator = Generator::new(&config)?;
        let decoder = Decoder::new(&config)?;

        #[cfg(feature = "tracing")]
        info!(
            worker_id = config.worker_id,
            timestamp_bits = config.timestamp_bits,
            worker_id_bits = config.worker_id_bits,
            sequence_bits = config.sequence_bits,
            epoch_ms = config.epoch.as_millis() as u64,
            "id services ready"
        );

        Ok(IdServices {
            config: Arc::new(config),
            generator: Arc::new(generator),
            decoder,
        })
    }
}

impl core::fmt::Debug for IdServicesBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdServicesBuilder")
            .field("config", &self.config)
            .field("configure", &self.configure.len())
            .finish()
    }
}
