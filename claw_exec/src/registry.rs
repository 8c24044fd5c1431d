//! # Joint Registry
//!
//! The registry owns every joint of the arm together with the actuator which moves them. It caches
//! the last commanded angle of each joint, and is the only place those angles are changed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{JointId, JointState, MAX_ANGLE_DEG};
use log::debug;

use crate::servo_ctrl::{ActuationError, Actuator};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single joint of the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joint {
    pub id: JointId,

    /// Last commanded angle, always within `[0, 180]`.
    ///
    /// Units: degrees
    pub angle_deg: u8,
}

/// Fixed, ordered set of joints plus the actuator driving them.
///
/// The set of joints is decided at construction and never changes afterwards. Iteration follows
/// the order the joints were declared in.
pub struct JointRegistry {
    joints: Vec<Joint>,

    actuator: Box<dyn Actuator>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors in the joint declaration given to [`JointRegistry::new`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Joint {0} is declared more than once")]
    DuplicateJoint(JointId),

    #[error("Joint {0} is not declared")]
    MissingJoint(JointId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointRegistry {
    /// Create the registry from the declared joint order.
    ///
    /// Every [`JointId`] must be declared exactly once. The cached angle of each joint is read back
    /// from the actuator, or set to the joint's neutral angle if the actuator doesn't know it.
    pub fn new(order: &[JointId], actuator: Box<dyn Actuator>) -> Result<Self, RegistryError> {
        let mut joints: Vec<Joint> = Vec::with_capacity(order.len());

        for &id in order {
            if joints.iter().any(|j| j.id == id) {
                return Err(RegistryError::DuplicateJoint(id));
            }

            joints.push(Joint {
                id,
                angle_deg: actuator
                    .read_angle(id)
                    .map(|a| a.min(MAX_ANGLE_DEG))
                    .unwrap_or_else(|| id.neutral_deg()),
            });
        }

        if let Some(missing) = JointId::ALL
            .iter()
            .find(|id| !joints.iter().any(|j| j.id == **id))
        {
            return Err(RegistryError::MissingJoint(*missing));
        }

        Ok(Self { joints, actuator })
    }

    #[cfg(test)]
    fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    /// Last commanded angle of the joint.
    pub fn angle(&self, id: JointId) -> Option<u8> {
        self.joints.iter().find(|j| j.id == id).map(|j| j.angle_deg)
    }

    /// Drive the joint to the given angle and record it.
    ///
    /// The cached angle is only updated once the actuator has accepted the demand.
    pub fn set_angle(&mut self, id: JointId, angle_deg: u8) -> Result<(), ActuationError> {
        if angle_deg > MAX_ANGLE_DEG {
            return Err(ActuationError::InvalidAngle(angle_deg));
        }

        let joint = self
            .joints
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(ActuationError::UnknownJoint(id))?;

        self.actuator.set_angle(id, angle_deg)?;

        debug!("{}: {} -> {} deg", id, joint.angle_deg, angle_deg);
        joint.angle_deg = angle_deg;

        Ok(())
    }

    /// Move every joint to its neutral angle, in declaration order.
    ///
    /// Stops at the first joint which can't be actuated, joints before it keep their new angle.
    pub fn home(&mut self) -> Result<(), ActuationError> {
        let ids: Vec<JointId> = self.joints.iter().map(|j| j.id).collect();

        for id in ids {
            self.set_angle(id, id.neutral_deg())?;
        }

        Ok(())
    }

    /// Snapshot of all joint angles in declaration order.
    pub fn snapshot(&self) -> JointState {
        JointState {
            angles_deg: self.joints.iter().map(|j| (j.id, j.angle_deg)).collect(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    /// Actuator recording every demand, optionally failing for one joint.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingActuator {
        pub demands: Rc<RefCell<Vec<(JointId, u8)>>>,
        pub fail_on: Option<JointId>,
        pub initial: HashMap<JointId, u8>,
    }

    impl Actuator for RecordingActuator {
        fn set_angle(&mut self, joint: JointId, angle_deg: u8) -> Result<(), ActuationError> {
            if self.fail_on == Some(joint) {
                return Err(ActuationError::I2c);
            }
            self.demands.borrow_mut().push((joint, angle_deg));
            Ok(())
        }

        fn read_angle(&self, joint: JointId) -> Option<u8> {
            self.initial.get(&joint).copied()
        }
    }

    pub(crate) fn registry_with(actuator: RecordingActuator) -> JointRegistry {
        JointRegistry::new(&JointId::ALL, Box::new(actuator)).unwrap()
    }

    #[test]
    fn test_initial_angles() {
        let mut actuator = RecordingActuator::default();
        actuator.initial.insert(JointId::Wrist, 12);

        let registry = registry_with(actuator);

        assert_eq!(registry.angle(JointId::Base), Some(90));
        assert_eq!(registry.angle(JointId::Wrist), Some(12));
        assert_eq!(registry.angle(JointId::Claw), Some(0));
    }

    #[test]
    fn test_declaration_order() {
        let order = [
            JointId::Claw,
            JointId::Wrist,
            JointId::Arm2,
            JointId::Arm1,
            JointId::Base,
        ];
        let registry =
            JointRegistry::new(&order, Box::new(RecordingActuator::default())).unwrap();

        let ids: Vec<JointId> = registry.joints().map(|j| j.id).collect();
        assert_eq!(ids, order.to_vec());
        assert_eq!(
            registry.snapshot().to_string(),
            "claw:0;wrist:90;arm2:90;arm1:90;base:90;"
        );
    }

    #[test]
    fn test_invalid_declarations() {
        assert_eq!(
            JointRegistry::new(
                &[JointId::Base, JointId::Base],
                Box::new(RecordingActuator::default())
            )
            .err(),
            Some(RegistryError::DuplicateJoint(JointId::Base))
        );
        assert_eq!(
            JointRegistry::new(
                &[JointId::Base, JointId::Arm1, JointId::Arm2, JointId::Wrist],
                Box::new(RecordingActuator::default())
            )
            .err(),
            Some(RegistryError::MissingJoint(JointId::Claw))
        );
    }

    #[test]
    fn test_set_angle_drives_actuator() {
        let actuator = RecordingActuator::default();
        let demands = actuator.demands.clone();
        let mut registry = registry_with(actuator);

        registry.set_angle(JointId::Arm2, 33).unwrap();

        assert_eq!(registry.angle(JointId::Arm2), Some(33));
        assert_eq!(*demands.borrow(), vec![(JointId::Arm2, 33)]);

        assert_eq!(
            registry.set_angle(JointId::Arm2, 200),
            Err(ActuationError::InvalidAngle(200))
        );
        assert_eq!(registry.angle(JointId::Arm2), Some(33));
    }

    #[test]
    fn test_failed_actuation_keeps_angle() {
        let actuator = RecordingActuator {
            fail_on: Some(JointId::Wrist),
            ..Default::default()
        };
        let mut registry = registry_with(actuator);

        assert_eq!(
            registry.set_angle(JointId::Wrist, 10),
            Err(ActuationError::I2c)
        );
        assert_eq!(registry.angle(JointId::Wrist), Some(90));
    }

    #[test]
    fn test_home() {
        let actuator = RecordingActuator::default();
        let demands = actuator.demands.clone();
        let mut registry = registry_with(actuator);

        registry.set_angle(JointId::Base, 0).unwrap();
        registry.set_angle(JointId::Claw, 180).unwrap();
        demands.borrow_mut().clear();

        registry.home().unwrap();

        assert_eq!(
            registry.snapshot().to_string(),
            "base:90;arm1:90;arm2:90;wrist:90;claw:0;"
        );
        assert_eq!(
            *demands.borrow(),
            JointId::ALL
                .iter()
                .map(|j| (*j, j.neutral_deg()))
                .collect::<Vec<_>>()
        );
    }
}
