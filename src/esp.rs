use esp_idf_hal::adc::attenuation::{DB_11, DB_2_5, DB_6, NONE};
use esp_idf_hal::adc::oneshot::config::{AdcChannelConfig, Calibration};
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{ADCPin, IOPin, Pin};
use esp_idf_hal::peripheral::{Peripheral, PeripheralRef};
use esp_idf_sys::{self as sys, esp, EspError};

use crate::platform::{AdcLine, AdcSetup, Attenuation, Clock, LineMode, Pull, SingleWireLine};

pub struct EspLine<'d, P: IOPin> {
    pin: PeripheralRef<'d, P>,
}

impl<'d, P: IOPin> EspLine<'d, P> {
    pub fn new(pin: impl Peripheral<P = P> + 'd, pull: Pull) -> Result<Self, EspError> {
        let pin = pin.into_ref();
        let (pull_up_en, pull_down_en) = match pull {
            Pull::Floating => (
                sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
                sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            ),
            Pull::Up => (
                sys::gpio_pullup_t_GPIO_PULLUP_ENABLE,
                sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            ),
            Pull::Down => (
                sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
                sys::gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            ),
        };

        let conf = sys::gpio_config_t {
            pin_bit_mask: 1u64 << pin.pin(),
            mode: sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en,
            pull_down_en,
            intr_type: sys::gpio_int_type_t_GPIO_INTR_DISABLE,
            ..Default::default()
        };
        esp!(unsafe { sys::gpio_config(&conf) })?;

        Ok(Self { pin })
    }
}

impl<P: IOPin> SingleWireLine for EspLine<'_, P> {
    type Error = EspError;

    fn set_mode(&mut self, mode: LineMode) -> Result<(), EspError> {
        let mode = match mode {
            LineMode::Output => sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            LineMode::Input => sys::gpio_mode_t_GPIO_MODE_INPUT,
        };
        esp!(unsafe { sys::gpio_set_direction(self.pin.pin(), mode) })
    }

    fn set_level(&mut self, high: bool) -> Result<(), EspError> {
        esp!(unsafe { sys::gpio_set_level(self.pin.pin(), u32::from(high)) })
    }

    fn is_high(&mut self) -> bool {
        unsafe { sys::gpio_get_level(self.pin.pin()) != 0 }
    }
}

// Both delays busy-wait in the ROM loop; a FreeRTOS sleep rounds to whole
// ticks and can end a start pulse early.
#[derive(Debug, Default, Clone, Copy)]
pub struct EspClock;

impl Clock for EspClock {
    fn now_us(&self) -> u64 {
        unsafe { sys::esp_timer_get_time() as u64 }
    }

    fn delay_ms(&mut self, ms: u32) {
        Ets::delay_ms(ms);
    }

    fn delay_us(&mut self, us: u32) {
        Ets::delay_us(us);
    }
}

enum AdcState<'d, P: ADCPin> {
    Idle {
        adc: AdcDriver<'d, P::Adc>,
        pin: P,
    },
    Ready(AdcChannelDriver<'d, P, AdcDriver<'d, P::Adc>>),
    Broken,
}

// The channel driver only exists once `configure` has run.
pub struct EspAdcLine<'d, P: ADCPin> {
    state: AdcState<'d, P>,
}

impl<'d, P> EspAdcLine<'d, P>
where
    P: ADCPin + Peripheral<P = P> + 'd,
{
    pub fn new(adc: AdcDriver<'d, P::Adc>, pin: P) -> Self {
        Self {
            state: AdcState::Idle { adc, pin },
        }
    }
}

impl<'d, P> AdcLine for EspAdcLine<'d, P>
where
    P: ADCPin + Peripheral<P = P> + 'd,
{
    type Error = EspError;

    fn configure(&mut self, setup: &AdcSetup) -> Result<(), EspError> {
        if setup.resolution_bits != 12 {
            return Err(EspError::from_infallible::<{ sys::ESP_ERR_INVALID_ARG }>());
        }

        let (adc, pin) = match core::mem::replace(&mut self.state, AdcState::Broken) {
            AdcState::Idle { adc, pin } => (adc, pin),
            ready @ AdcState::Ready(_) => {
                self.state = ready;
                return Err(EspError::from_infallible::<{ sys::ESP_ERR_INVALID_STATE }>());
            }
            AdcState::Broken => {
                return Err(EspError::from_infallible::<{ sys::ESP_ERR_INVALID_STATE }>());
            }
        };

        let config = AdcChannelConfig {
            attenuation: match setup.attenuation {
                Attenuation::Db0 => NONE,
                Attenuation::Db2_5 => DB_2_5,
                Attenuation::Db6 => DB_6,
                Attenuation::Db11 => DB_11,
            },
            calibration: calibration_mode(),
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(adc, pin, &config)?;
        self.state = AdcState::Ready(channel);
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, EspError> {
        match &mut self.state {
            AdcState::Ready(channel) => channel.read_raw(),
            _ => Err(EspError::from_infallible::<{ sys::ESP_ERR_INVALID_STATE }>()),
        }
    }
}

#[cfg(all(
    any(esp_idf_comp_esp_adc_cal_enabled, esp_idf_comp_esp_adc_enabled),
    any(
        esp32c3,
        all(
            esp32c6,
            not(all(esp_idf_version_major = "5", esp_idf_version_minor = "0")),
            not(esp_idf_version_full = "5.1.0")
        ),
        esp32s3
    )
))]
fn calibration_mode() -> Calibration {
    Calibration::Curve
}

// Classic ESP32 (the board this firmware targets) only has line fitting.
#[cfg(all(
    any(esp_idf_comp_esp_adc_cal_enabled, esp_idf_comp_esp_adc_enabled),
    any(esp32, esp32c2, esp32s2)
))]
fn calibration_mode() -> Calibration {
    Calibration::Line
}

#[cfg(not(all(
    any(esp_idf_comp_esp_adc_cal_enabled, esp_idf_comp_esp_adc_enabled),
    any(
        esp32,
        esp32c2,
        esp32s2,
        esp32c3,
        all(
            esp32c6,
            not(all(esp_idf_version_major = "5", esp_idf_version_minor = "0")),
            not(esp_idf_version_full = "5.1.0")
        ),
        esp32s3
    )
)))]
fn calibration_mode() -> Calibration {
    Calibration::None
}
