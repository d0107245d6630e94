mod rsvp_controller_test;
