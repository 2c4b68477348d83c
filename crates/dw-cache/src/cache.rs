//! Get-or-compute access to per-frame error series.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dw_core::codec::{decode, CanonicalName, PartialConfig};
use dw_core::config::{FoveaMovement, SamplingDescriptor};
use dw_core::context::SweepContext;
use dw_core::errors::{DwError, ErrorInfo};
use dw_core::measure::Field;
use dw_core::metadata::check_metadata;
use dw_frames::{count, ExrDecoder, FrameDecoder, FrameSequence, FrameTemplate, SequenceOptions};
use dw_metric::{fovea_mask, MetricEngine, SsimWindow};
use tracing::{debug, info};

use crate::sidecar::{read_sidecar, sidecar_path, write_sidecar};
use crate::state::{cache_state, CacheState};

/// Series returned for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome {
    /// One value per frame for every requested field.
    pub values: BTreeMap<Field, Vec<f64>>,
    /// True when the series were computed from frames in this call.
    pub recomputed: bool,
}

/// Result cache for the candidates of one sweep.
#[derive(Debug)]
pub struct ResultCache<D: FrameDecoder + Clone = ExrDecoder> {
    context: SweepContext,
    engine: MetricEngine,
    template: FrameTemplate,
    decoder: D,
}

impl ResultCache<ExrDecoder> {
    /// Cache reading OpenEXR frames as described by `context`.
    pub fn new(context: SweepContext) -> Result<Self, DwError> {
        Self::with_decoder(context, ExrDecoder)
    }
}

impl<D: FrameDecoder + Clone> ResultCache<D> {
    /// Cache reading frames with `decoder`.
    pub fn with_decoder(context: SweepContext, decoder: D) -> Result<Self, DwError> {
        context.validate()?;
        let template = FrameTemplate::new(&context.frame_pattern())?;
        let window = if context.variant.fast {
            SsimWindow::fast()
        } else {
            SsimWindow::default()
        };
        let engine = MetricEngine::new(context.device).with_window(window);
        Ok(Self {
            context,
            engine,
            template,
            decoder,
        })
    }

    /// Context the cache was built from.
    pub fn context(&self) -> &SweepContext {
        &self.context
    }

    /// Per-frame values of `field` for `candidate`.
    ///
    /// `expected` is checked against the candidate's metadata as in
    /// [`ResultCache::get_or_compute_all`].
    pub fn get_or_compute(
        &self,
        candidate: &CanonicalName,
        field: Field,
        expected: Option<&PartialConfig>,
    ) -> Result<Vec<f64>, DwError> {
        let mut outcome = self.get_or_compute_fields(candidate, &[field], expected)?;
        outcome.values.remove(&field).ok_or_else(|| {
            DwError::config("cache-field", format!("field {field} was not produced"))
        })
    }

    /// Per-frame values of every context field for `candidate`.
    ///
    /// With `expected` the candidate's metadata must record the same encoded
    /// fields before any sidecar is trusted.
    pub fn get_or_compute_all(
        &self,
        candidate: &CanonicalName,
        expected: Option<&PartialConfig>,
    ) -> Result<CacheOutcome, DwError> {
        self.get_or_compute_fields(candidate, &self.context.fields, expected)
    }

    fn get_or_compute_fields(
        &self,
        candidate: &CanonicalName,
        fields: &[Field],
        expected: Option<&PartialConfig>,
    ) -> Result<CacheOutcome, DwError> {
        let candidate_dir = self.context.candidate_dir(candidate);
        let reference_dir = self.context.reference_dir();
        if !candidate_dir.is_dir() {
            return Err(DwError::MissingCandidate(
                ErrorInfo::new("candidate-missing", "candidate run directory does not exist")
                    .with_path(&candidate_dir)
                    .with_context("name", candidate.as_str()),
            ));
        }
        if !reference_dir.is_dir() {
            return Err(DwError::MissingReference(
                ErrorInfo::new("reference-missing", "reference run directory does not exist")
                    .with_path(&reference_dir),
            ));
        }
        if let Some(expected) = expected {
            check_metadata(&candidate_dir, expected)?;
        }

        let kind = self.context.error_kind;
        let variant = self.context.variant;
        let states: Vec<(Field, PathBuf, CacheState)> = fields
            .iter()
            .map(|&field| {
                let path = sidecar_path(&candidate_dir, field, kind, &variant);
                let state = cache_state(&path, &candidate_dir, &reference_dir, self.context.force);
                (field, path, state)
            })
            .collect();

        if states.iter().all(|(_, _, state)| state.is_valid()) {
            let required = self.context.required_frames();
            let mut values = BTreeMap::new();
            for (field, path, _) in &states {
                values.insert(*field, read_sidecar(path)?);
            }
            match values.iter().find(|(_, series)| series.len() != required) {
                None => {
                    debug!(candidate = %candidate, "reusing cached error series");
                    return Ok(CacheOutcome {
                        values,
                        recomputed: false,
                    });
                }
                Some((field, series)) => debug!(
                    candidate = %candidate,
                    field = %field,
                    cached = series.len(),
                    required,
                    "cached series length differs from the sweep, recomputing"
                ),
            }
        } else {
            for (field, _, state) in &states {
                debug!(candidate = %candidate, field = %field, state = ?state, "cache entry needs recompute");
            }
        }

        let mut computed = self.context.fields.clone();
        for field in fields {
            if !computed.contains(field) {
                computed.push(*field);
            }
        }
        let values = self.recompute(candidate, &candidate_dir, &reference_dir, &computed)?;
        for (field, series) in &values {
            write_sidecar(&sidecar_path(&candidate_dir, *field, kind, &variant), series)?;
        }
        info!(
            candidate = %candidate,
            frames = values.values().next().map_or(0, Vec::len),
            "computed error series"
        );
        let values = values
            .into_iter()
            .filter(|(field, _)| fields.contains(field))
            .collect();
        Ok(CacheOutcome {
            values,
            recomputed: true,
        })
    }

    fn ensure_frames(&self, dir: &Path, required: usize) -> Result<(), DwError> {
        let found = count(dir, &self.template);
        if found < required {
            return Err(DwError::InsufficientFrames(
                ErrorInfo::new("frames-insufficient", "run has fewer frames than the sweep duration")
                    .with_path(dir)
                    .with_context("found", found.to_string())
                    .with_context("required", required.to_string())
                    .with_context("missing", (required - found).to_string()),
            ));
        }
        Ok(())
    }

    fn fovea(&self, candidate: &CanonicalName) -> Result<Option<(f64, FoveaMovement)>, DwError> {
        if !self.context.variant.fovea {
            return Ok(None);
        }
        let partial = decode(candidate.as_str(), &self.context.scene_name)?;
        let (radius, movement) = match partial.sampling {
            SamplingDescriptor::Foveated(sampling) => (Some(sampling.radius), sampling.movement),
            _ => (None, FoveaMovement::default_lissajous()),
        };
        match self.context.fovea_radius.or(radius) {
            Some(radius) => Ok(Some((radius, movement))),
            None => Err(DwError::Config(
                ErrorInfo::new("cache-fovea-radius", "fovea masking needs a radius")
                    .with_context("name", candidate.as_str())
                    .with_hint("set fovea_radius in the sweep context"),
            )),
        }
    }

    /// Single pass over the paired sequences computing every field in `fields`.
    fn recompute(
        &self,
        candidate: &CanonicalName,
        candidate_dir: &Path,
        reference_dir: &Path,
        fields: &[Field],
    ) -> Result<BTreeMap<Field, Vec<f64>>, DwError> {
        let required = self.context.required_frames();
        self.ensure_frames(reference_dir, required)?;
        self.ensure_frames(candidate_dir, required)?;
        let fovea = self.fovea(candidate)?;

        let options = SequenceOptions {
            expected: Some(required),
            retries: self.context.retries,
            retry_delay: self.context.retry_delay(),
        };
        let references = FrameSequence::with_decoder(
            reference_dir,
            self.template.clone(),
            options.clone(),
            self.decoder.clone(),
        );
        let candidates = FrameSequence::with_decoder(
            candidate_dir,
            self.template.clone(),
            options,
            self.decoder.clone(),
        );

        let mut values: BTreeMap<Field, Vec<f64>> = fields
            .iter()
            .map(|field| (*field, Vec::with_capacity(required)))
            .collect();
        for (index, (reference, frame)) in references.zip(candidates).take(required).enumerate() {
            let (reference, frame) = (reference?, frame?);
            let mask = match &fovea {
                Some((radius, movement)) => Some(fovea_mask(
                    reference.width(),
                    reference.height(),
                    *radius,
                    movement,
                    index,
                    self.context.fps,
                )?),
                None => None,
            };
            let report = self.engine.evaluate_frame(
                &reference,
                &frame,
                self.context.error_kind,
                fields,
                mask.as_ref(),
            )?;
            for (field, value) in report.iter() {
                if let Some(series) = values.get_mut(&field) {
                    series.push(value);
                }
            }
            debug!(candidate = %candidate, frame = index + 1, "evaluated frame");
        }
        Ok(values)
    }
}
