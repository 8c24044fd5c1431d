//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use pwm_pca9685::{Channel, Pca9685};
use embedded_hal::blocking::i2c::{Write, WriteRead};

use super::{ActuationError, ServoDriver};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const MAX_PWM: u16 = 4096;

/// Frequency of the PCA9685 internal oscillator.
///
/// Units: Hertz
const OSCILLATOR_HZ: f64 = 25_000_000.0;

/// Smallest prescale value accepted by the chip.
const MIN_PRESCALE: u8 = 3;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the board channel with the given index (0 to 15).
pub fn channel_from_index(index: u8) -> Option<Channel> {
    let channel = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };

    Some(channel)
}

/// Prescale register value which gives the closest PWM frequency to the demanded one.
pub fn prescale_for(pwm_frequency_hz: f64) -> u8 {
    let prescale = (OSCILLATOR_HZ / (MAX_PWM as f64 * pwm_frequency_hz)).round() - 1.0;

    prescale.max(MIN_PRESCALE as f64).min(u8::MAX as f64) as u8
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where 
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    type Channel = Channel;

    fn set_duty_cycle(
        &mut self, 
        channel: Self::Channel, 
        duty_cycle: f64
    ) -> Result<(), ActuationError> {

        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ActuationError::InvalidDutyCycle)
        }

        // The pulse starts at the beginning of the cycle and ends after the on-time
        let off = ((duty_cycle*(MAX_PWM as f64)) as u16).min(MAX_PWM - 1);

        match self.set_channel_on_off(channel, 0, off) {
            Ok(_) => Ok(()),
            Err(pwm_pca9685::Error::I2C(_)) => Err(ActuationError::I2c),
            Err(pwm_pca9685::Error::InvalidInputData) => Err(ActuationError::InvalidDutyCycle)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prescale() {
        // Value given in the PCA9685 datasheet for 200 Hz
        assert_eq!(prescale_for(200.0), 30);
        // Standard servo frequency
        assert_eq!(prescale_for(50.0), 121);
        // Clamped to the chip limits
        assert_eq!(prescale_for(5000.0), MIN_PRESCALE);
        assert_eq!(prescale_for(1.0), u8::MAX);
    }

    #[test]
    fn test_channel_from_index() {
        assert!(matches!(channel_from_index(0), Some(Channel::C0)));
        assert!(matches!(channel_from_index(15), Some(Channel::C15)));
        assert!(channel_from_index(16).is_none());
    }
}
