//! Behavior integration tests driven through the squad simulation

use glam::Vec3;
use squad_command::behavior::communicate::Source;
use squad_command::behavior::memory::{
    COMMANDER, COVER, ENEMY, ENEMY_POSITION, FACE_TARGET, MOVE_SPEED, MOVE_TARGET, TEAM_COMM,
};
use squad_command::behavior::*;
use squad_command::comms::CommunicationBus;
use squad_command::core::config::FormationConfig;
use squad_command::core::types::{EntityId, ReferenceFrame};
use squad_command::formation::SlotStrategy;
use squad_command::simulation::{SquadSimulation, SquadWorld};

const DT: f32 = 0.1;

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

fn new_sim() -> SquadSimulation {
    SquadSimulation::new(FormationConfig::default(), 7)
}

/// Commander at the origin facing +Z with the default commander harnesses
fn with_commander(sim: &mut SquadSimulation) -> EntityId {
    let commander = sim.spawn_agent("commander", ReferenceFrame::default());
    sim.add_behavior(commander, Box::new(TakeCommand::new()));
    commander
}

fn add_follower(sim: &mut SquadSimulation, commander: EntityId, frame: ReferenceFrame) -> EntityId {
    let follower = sim.spawn_agent("follower", frame);
    sim.agent_mut(follower).unwrap().memory.set(COMMANDER, commander);
    sim.add_behavior(follower, Box::new(FormationFollow::new(SlotStrategy::First)));
    follower
}

fn memory_position(sim: &SquadSimulation, agent: EntityId, variable: &str) -> Option<Vec3> {
    sim.agent(agent).and_then(|a| a.memory.position(variable))
}

#[test]
fn test_follower_takes_slot_and_writes_targets() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(-1.0, 0.0, -6.0), 0.0));

    sim.tick(DT);

    let set = sim.world.harness_set(commander).unwrap();
    let column = set.active_harness().unwrap();
    assert_eq!(column.name(), "Column");
    assert_eq!(column.occupant(0), Some(follower));

    // Two columns, 2 m apart, rows 2 m behind the commander
    let target = memory_position(&sim, follower, MOVE_TARGET).unwrap();
    assert!(approx(target, Vec3::new(-1.0, 0.0, -2.0)));
    assert_eq!(sim.agent(follower).unwrap().result_of("formation_follow"), Some(ActionResult::Running));
}

#[test]
fn test_follower_in_slot_faces_harness_heading() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(-1.0, 0.0, -2.0), 90.0));

    sim.tick(DT);

    let face = memory_position(&sim, follower, FACE_TARGET).unwrap();
    assert!(approx(face, Vec3::new(-1.0, 0.0, -1.0)));
}

#[test]
fn test_follower_past_slot_keeps_facing_forward() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(-1.0, 0.0, 5.0), 0.0));

    sim.tick(DT);

    // Slot is behind and the harness points the same way, so no turning round
    let face = memory_position(&sim, follower, FACE_TARGET).unwrap();
    assert!(approx(face, Vec3::new(-1.0, 0.0, 6.0)));
}

#[test]
fn test_follower_facing_away_from_harness_faces_slot() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(-1.0, 0.0, 5.0), 180.0));

    sim.tick(DT);

    let face = memory_position(&sim, follower, FACE_TARGET).unwrap();
    assert!(approx(face, Vec3::new(-1.0, 0.0, -2.0)));
}

#[test]
fn test_formation_switch_moves_followers() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let a = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, -5.0), 0.0));
    let b = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(2.0, 0.0, -5.0), 0.0));
    sim.tick(DT);

    sim.world.harness_set_mut(commander).unwrap().set_active("Perimeter");
    sim.tick(DT);

    let set = sim.world.harness_set(commander).unwrap();
    let column = set.get("Column").unwrap();
    let perimeter = set.get("Perimeter").unwrap();
    assert_eq!(column.occupied_count(), 0);
    assert_eq!(perimeter.slot_of(a), Some(0));
    assert_eq!(perimeter.slot_of(b), Some(1));

    let target = memory_position(&sim, a, MOVE_TARGET).unwrap();
    assert!(approx(target, perimeter.slot_position(0)));
}

#[test]
fn test_removing_follow_releases_slot() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::default());
    sim.tick(DT);
    assert_eq!(sim.world.harness_set(commander).unwrap().active_harness().unwrap().occupied_count(), 1);

    assert!(sim.remove_behavior(follower, "formation_follow"));
    assert_eq!(sim.world.harness_set(commander).unwrap().active_harness().unwrap().occupied_count(), 0);
}

#[test]
fn test_follower_without_commander_fails() {
    let mut sim = new_sim();
    let follower = sim.spawn_agent("straggler", ReferenceFrame::default());
    sim.add_behavior(follower, Box::new(FormationFollow::new(SlotStrategy::Closest)));

    let events = sim.tick(DT);
    assert_eq!(events.len(), 1);
    assert_eq!(sim.agent(follower).unwrap().result_of("formation_follow"), Some(ActionResult::Failure));
}

#[test]
fn test_stepping_down_from_command_strands_no_one() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::default());
    sim.tick(DT);
    assert!(sim.world.is_commander(commander));

    assert!(sim.remove_behavior(commander, "take_command"));
    assert!(!sim.world.is_commander(commander));
    assert!(sim.world.harness_set(commander).is_none());

    sim.tick(DT);
    assert_eq!(sim.agent(follower).unwrap().result_of("formation_follow"), Some(ActionResult::Failure));
}

#[test]
fn test_stepping_down_keeps_attack_harness() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let attacker = sim.spawn_agent("attacker", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, -20.0), 0.0));
    sim.agent_mut(attacker).unwrap().memory.set(ENEMY, commander);
    sim.add_behavior(attacker, Box::new(AttackPosition::new(SlotStrategy::Closest)));
    sim.tick(DT);

    sim.remove_behavior(commander, "take_command");
    let set = sim.world.harness_set(commander).unwrap();
    assert!(set.find_enabled("attack").is_some());
    assert!(set.active_harness().is_none());
}

#[test]
fn test_attackers_share_harness_on_enemy() {
    let mut sim = new_sim();
    let enemy = sim.world.spawn_body("enemy", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, 40.0), 180.0));
    let mut attackers = Vec::new();
    for x in [-5.0, 5.0] {
        let id = sim.spawn_agent("attacker", ReferenceFrame::from_yaw_degrees(Vec3::new(x, 0.0, 0.0), 0.0));
        sim.agent_mut(id).unwrap().memory.set(ENEMY, enemy);
        sim.add_behavior(id, Box::new(AttackPosition::new(SlotStrategy::Closest)));
        attackers.push(id);
    }

    sim.tick(DT);

    let set = sim.world.harness_set(enemy).unwrap();
    assert_eq!(set.iter().count(), 1);
    let attack = set.find_enabled("attack").unwrap();
    assert_eq!(attack.max_positions(), 10);
    assert_eq!(attack.occupied_count(), 2);

    let slots: Vec<_> = attackers.iter().map(|a| attack.slot_of(*a).unwrap()).collect();
    assert_ne!(slots[0], slots[1]);

    for (agent, slot) in attackers.iter().zip(slots) {
        let target = memory_position(&sim, *agent, MOVE_TARGET).unwrap();
        assert!(approx(target, attack.slot_position(slot)));
        let range = target.distance(Vec3::new(0.0, 0.0, 40.0));
        assert!((7.0..=17.0).contains(&range), "attack range {}", range);
    }
}

#[test]
fn test_attacker_falls_back_to_last_sighting() {
    let mut sim = new_sim();
    let attacker = sim.spawn_agent("attacker", ReferenceFrame::default());
    sim.agent_mut(attacker).unwrap().memory.set(ENEMY_POSITION, Vec3::new(0.0, 0.0, 10.0));
    sim.add_behavior(attacker, Box::new(AttackPosition::new(SlotStrategy::Closest)));

    sim.tick(DT);

    let target = memory_position(&sim, attacker, MOVE_TARGET).unwrap();
    assert!(approx(target, Vec3::new(0.0, 0.0, 9.0)));
    assert_eq!(sim.agent(attacker).unwrap().result_of("attack_position"), Some(ActionResult::Running));
}

#[test]
fn test_attacker_holds_position_with_nothing_known() {
    let mut sim = new_sim();
    let attacker = sim.spawn_agent("attacker", ReferenceFrame::from_yaw_degrees(Vec3::new(3.0, 0.0, 4.0), 0.0));
    sim.add_behavior(attacker, Box::new(AttackPosition::new(SlotStrategy::First)));

    sim.tick(DT);

    let target = memory_position(&sim, attacker, MOVE_TARGET).unwrap();
    assert!(approx(target, Vec3::new(3.0, 0.0, 4.0)));
}

#[test]
fn test_cover_prefers_low_cost_and_fails_when_evicted() {
    let mut sim = new_sim();
    let enemy = sim.world.spawn_body("enemy", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, 20.0), 180.0));
    let near_threat = sim.world.add_cover_point(Vec3::new(0.0, 0.0, 10.0));
    let beside = sim.world.add_cover_point(Vec3::new(5.0, 0.0, 0.0));

    let first = sim.spawn_agent("first", ReferenceFrame::default());
    let second = sim.spawn_agent("second", ReferenceFrame::default());
    for id in [first, second] {
        sim.agent_mut(id).unwrap().memory.set(ENEMY, enemy);
        sim.add_behavior(id, Box::new(FindCoverPoint::new()));
    }
    sim.tick(DT);

    assert_eq!(sim.world.objective(near_threat).unwrap().occupant(), Some(first));
    assert_eq!(sim.world.objective(beside).unwrap().occupant(), Some(second));
    assert!(approx(memory_position(&sim, first, COVER).unwrap(), Vec3::new(0.0, 0.0, 10.0)));

    let intruder = EntityId::new();
    assert!(sim.world.objective_mut(near_threat).unwrap().occupy(intruder, true));
    sim.tick(DT);

    assert_eq!(sim.agent(first).unwrap().result_of("find_cover_point"), Some(ActionResult::Failure));
    assert_eq!(sim.agent(second).unwrap().result_of("find_cover_point"), Some(ActionResult::Running));
}

#[test]
fn test_cover_without_free_points_stays_put() {
    let mut sim = new_sim();
    let taken = sim.world.add_cover_point(Vec3::new(0.0, 0.0, 10.0));
    sim.world.objective_mut(taken).unwrap().occupy(EntityId::new(), false);

    let agent = sim.spawn_agent("agent", ReferenceFrame::from_yaw_degrees(Vec3::new(1.0, 0.0, 1.0), 0.0));
    sim.add_behavior(agent, Box::new(FindCoverPoint::new()));
    sim.tick(DT);

    assert!(approx(memory_position(&sim, agent, COVER).unwrap(), Vec3::new(1.0, 0.0, 1.0)));
    assert_eq!(sim.agent(agent).unwrap().result_of("find_cover_point"), Some(ActionResult::Failure));
}

#[test]
fn test_cover_face_looks_at_threat_area() {
    let mut sim = new_sim();
    sim.world.add_threat_area(Vec3::new(10.0, 0.0, 0.0));
    sim.world.add_threat_area(Vec3::new(-30.0, 0.0, 0.0));
    let agent = sim.spawn_agent("agent", ReferenceFrame::default());
    sim.add_behavior(agent, Box::new(CoverFaceDirection::new()));

    sim.tick(DT);

    assert!(approx(memory_position(&sim, agent, FACE_TARGET).unwrap(), Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(sim.agent(agent).unwrap().result_of("cover_face_direction"), Some(ActionResult::Success));
    // Turned to face east
    let yaw = sim.world.body(agent).unwrap().frame.yaw_degrees();
    assert!((yaw - 90.0).abs() < 1e-2);
}

#[test]
fn test_cover_face_clears_target_with_no_threat() {
    let mut sim = new_sim();
    let agent = sim.spawn_agent("agent", ReferenceFrame::default());
    sim.agent_mut(agent).unwrap().memory.set(FACE_TARGET, Vec3::ONE);
    sim.add_behavior(agent, Box::new(CoverFaceDirection::new()));

    sim.tick(DT);
    assert!(!sim.agent(agent).unwrap().memory.contains(FACE_TARGET));
}

#[test]
fn test_patrol_speed_hysteresis() {
    let config = FormationConfig::default();
    let mut world = SquadWorld::new(1);
    let mut bus = CommunicationBus::new();
    let mut memory = Memory::new();
    let agent = world.spawn_body("walker", ReferenceFrame::default());
    memory.set(MOVE_TARGET, Vec3::ZERO);

    let mut patrol = PatrolSpeed::new();
    let mut speed_at = |z: f32, world: &mut SquadWorld, memory: &mut Memory| {
        world.body_mut(agent).unwrap().frame.position = Vec3::new(0.0, 0.0, z);
        let mut ctx = BehaviorContext::new(agent, memory, world, &mut bus, &config, DT);
        assert_eq!(patrol.execute(&mut ctx), ActionResult::Running);
        memory.float(MOVE_SPEED).unwrap()
    };

    // Far: run. Closing: keep running until close enough.
    assert_eq!(speed_at(10.0, &mut world, &mut memory), 4.0);
    assert_eq!(speed_at(2.0, &mut world, &mut memory), 4.0);
    assert_eq!(speed_at(0.3, &mut world, &mut memory), 1.5);
    // Drifting inside the max distance stays at a walk
    assert_eq!(speed_at(2.0, &mut world, &mut memory), 1.5);
    assert_eq!(speed_at(3.5, &mut world, &mut memory), 4.0);
}

#[test]
fn test_patrol_speed_without_target_fails() {
    let mut sim = new_sim();
    let agent = sim.spawn_agent("agent", ReferenceFrame::default());
    sim.add_behavior(agent, Box::new(PatrolSpeed::new()));
    sim.tick(DT);
    assert_eq!(sim.agent(agent).unwrap().result_of("patrol_speed"), Some(ActionResult::Failure));
}

#[test]
fn test_team_relay_reaches_teammates_only() {
    let mut sim = new_sim();
    let enemy = sim.world.spawn_body("enemy", ReferenceFrame::default());

    let spotter = sim.spawn_agent("spotter", ReferenceFrame::default());
    let teammate = sim.spawn_agent("teammate", ReferenceFrame::default());
    let outsider = sim.spawn_agent("outsider", ReferenceFrame::default());
    sim.set_team(spotter, Some("blue"));
    sim.set_team(teammate, Some("blue"));
    sim.set_team(outsider, Some("red"));

    sim.agent_mut(spotter).unwrap().memory.set(ENEMY, enemy);
    sim.add_behavior(spotter, Box::new(Communicate::relay(Source::Variable(TEAM_COMM.into()), ENEMY)));

    sim.tick(DT);

    assert_eq!(sim.agent(teammate).unwrap().memory.entity(ENEMY), Some(enemy));
    assert_eq!(sim.agent(outsider).unwrap().memory.entity(ENEMY), None);
    assert_eq!(sim.bus.pending(teammate), 0);
}

#[test]
fn test_relayed_enemy_drives_attackers() {
    let mut sim = new_sim();
    let enemy = sim.world.spawn_body("enemy", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, 30.0), 180.0));
    let spotter = sim.spawn_agent("spotter", ReferenceFrame::default());
    let attacker = sim.spawn_agent("attacker", ReferenceFrame::default());
    sim.set_team(spotter, Some("blue"));
    sim.set_team(attacker, Some("blue"));

    sim.agent_mut(spotter).unwrap().memory.set(ENEMY, enemy);
    sim.add_behavior(spotter, Box::new(Communicate::relay(Source::Variable(TEAM_COMM.into()), ENEMY)));
    sim.add_behavior(attacker, Box::new(AttackPosition::new(SlotStrategy::Closest)));

    sim.tick(DT);

    let attack = sim.world.harness_set(enemy).unwrap().find_enabled("attack").unwrap();
    assert!(attack.slot_of(attacker).is_some());
}

fn spawn_on_team(sim: &mut SquadSimulation, team: &str, position: Vec3) -> EntityId {
    let id = sim.world.spawn_body(team, ReferenceFrame::from_yaw_degrees(position, 180.0));
    sim.world.set_team(id, Some(team));
    id
}

fn blue_scout(sim: &mut SquadSimulation) -> EntityId {
    let scout = sim.spawn_agent("scout", ReferenceFrame::default());
    sim.set_team(scout, Some("blue"));
    sim.add_behavior(scout, Box::new(DetectEnemy::new()));
    scout
}

#[test]
fn test_detect_picks_nearest_other_team() {
    let mut sim = new_sim();
    let scout = blue_scout(&mut sim);
    sim.world.spawn_body("civilian", ReferenceFrame::from_yaw_degrees(Vec3::new(0.0, 0.0, 1.0), 0.0));
    spawn_on_team(&mut sim, "blue", Vec3::new(0.0, 0.0, 2.0));
    let far = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 20.0));
    let near = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 10.0));

    sim.tick(DT);

    let agent = sim.agent(scout).unwrap();
    assert_eq!(agent.memory.entity(ENEMY), Some(near));
    assert_ne!(agent.memory.entity(ENEMY), Some(far));
    assert_eq!(agent.result_of("detect_enemy"), Some(ActionResult::Success));
}

#[test]
fn test_detect_keeps_previous_enemy_over_closer_one() {
    let mut sim = new_sim();
    let scout = blue_scout(&mut sim);
    let first = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 10.0));
    sim.tick(DT);

    spawn_on_team(&mut sim, "green", Vec3::new(0.0, 0.0, 3.0));
    sim.tick(DT);

    assert_eq!(sim.agent(scout).unwrap().memory.entity(ENEMY), Some(first));
}

#[test]
fn test_detect_replaces_enemy_that_switches_side_or_leaves_range() {
    let mut sim = new_sim();
    let scout = blue_scout(&mut sim);
    let near = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 10.0));
    let mid = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 20.0));
    let far = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 30.0));
    sim.tick(DT);
    assert_eq!(sim.agent(scout).unwrap().memory.entity(ENEMY), Some(near));

    sim.world.set_team(near, Some("blue"));
    sim.tick(DT);
    assert_eq!(sim.agent(scout).unwrap().memory.entity(ENEMY), Some(mid));

    let range = sim.config().detection_range;
    sim.world.body_mut(mid).unwrap().frame.position = Vec3::new(0.0, 0.0, range + 5.0);
    sim.tick(DT);
    assert_eq!(sim.agent(scout).unwrap().memory.entity(ENEMY), Some(far));
}

#[test]
fn test_detect_without_enemy_fails_and_clears() {
    let mut sim = new_sim();
    let scout = blue_scout(&mut sim);
    let stale = sim.world.spawn_body("gone", ReferenceFrame::default());
    sim.agent_mut(scout).unwrap().memory.set(ENEMY, stale);
    spawn_on_team(&mut sim, "blue", Vec3::new(0.0, 0.0, 4.0));
    spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 400.0));

    sim.tick(DT);

    let agent = sim.agent(scout).unwrap();
    assert_eq!(agent.memory.entity(ENEMY), None);
    assert_eq!(agent.result_of("detect_enemy"), Some(ActionResult::Failure));

    // No team, nothing to tell friend from foe
    let loner = sim.spawn_agent("loner", ReferenceFrame::default());
    sim.add_behavior(loner, Box::new(DetectEnemy::new()));
    spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 5.0));
    sim.tick(DT);
    assert_eq!(sim.agent(loner).unwrap().result_of("detect_enemy"), Some(ActionResult::Failure));
}

#[test]
fn test_detected_enemy_drives_attackers() {
    let mut sim = new_sim();
    let enemy = spawn_on_team(&mut sim, "red", Vec3::new(0.0, 0.0, 30.0));
    let scout = blue_scout(&mut sim);
    sim.add_behavior(scout, Box::new(AttackPosition::new(SlotStrategy::Closest)));

    sim.tick(DT);

    let attack = sim.world.harness_set(enemy).unwrap().find_enabled("attack").unwrap();
    assert!(attack.slot_of(scout).is_some());
}

#[test]
fn test_literal_broadcast_on_named_channel() {
    let mut sim = new_sim();
    let sender = sim.spawn_agent("sender", ReferenceFrame::default());
    let listener = sim.spawn_agent("listener", ReferenceFrame::default());
    sim.bus.subscribe("general", listener);
    sim.add_behavior(
        sender,
        Box::new(Communicate::new(
            Source::Literal("general".into()),
            "rallyPoint",
            Source::Literal(Vec3::new(4.0, 0.0, 4.0).into()),
        )),
    );

    sim.tick(DT);
    assert!(approx(memory_position(&sim, listener, "rallyPoint").unwrap(), Vec3::new(4.0, 0.0, 4.0)));
}

#[test]
fn test_removed_agent_gives_back_slots() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::default());
    sim.tick(DT);

    sim.remove_agent(follower);
    assert!(sim.agent(follower).is_none());
    assert_eq!(sim.world.harness_set(commander).unwrap().active_harness().unwrap().occupied_count(), 0);
}

#[test]
fn test_followers_converge_on_slots() {
    let mut sim = new_sim();
    let commander = with_commander(&mut sim);
    let follower = add_follower(&mut sim, commander, ReferenceFrame::from_yaw_degrees(Vec3::new(6.0, 0.0, -8.0), 0.0));
    sim.add_behavior(follower, Box::new(PatrolSpeed::new()));

    sim.run(100, DT);

    let position = sim.world.position_of(follower).unwrap();
    assert!(approx(position, Vec3::new(-1.0, 0.0, -2.0)));
}
